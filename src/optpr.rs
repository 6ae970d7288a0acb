use log::{debug, info, warn};

use psi_voting::builder::ScoreBuilder;
use psi_voting::psi::accuracy_sweep;
use psi_voting::quality::{quality_accurate, quality_fast, REFERENCE_NINTHS};
use psi_voting::rand48::Rand48;
use psi_voting::*;
use snafu::{prelude::*, Snafu};

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::json;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;
use crate::optpr::config_reader::*;
use crate::optpr::io_common::parse_score;

pub mod config_reader;
mod io_common;
mod io_csv;

#[derive(Debug, Snafu)]
pub enum OptprError {
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Expected a number in the configuration"))]
    ParsingJsonNumber {},
    #[snafu(display("The configuration file has no parent directory"))]
    MissingParentDir {},
    #[snafu(display("Error opening CSV file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error reading a CSV line"))]
    CsvLineParse { source: csv::Error },
    #[snafu(display("Line {lineno} is too short"))]
    CsvLineTooShort { lineno: usize },
    #[snafu(display("Invalid ballot count {value:?} on line {lineno}"))]
    InvalidCount { lineno: usize, value: String },
    #[snafu(display("Invalid score {value:?} on line {lineno}"))]
    InvalidScore { lineno: usize, value: String },
    #[snafu(display("Invalid ballot {id}: {source}"))]
    Ballot {
        source: OptimizerErrors,
        id: String,
    },
    #[snafu(display("Election error: {source}"))]
    Election { source: OptimizerErrors },
    #[snafu(display("Error writing summary to {path}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type OptprResult<T> = Result<T, OptprError>;

/// A ballot, as parsed by the readers.
/// This is before interpreting blanks and checking ranges.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ParsedBallot {
    pub id: String,
    pub lineno: usize,
    pub count: u32,
    pub scores: Vec<String>,
}

#[derive(PartialEq, Debug, Clone)]
struct ValidatedRules {
    search: SearchRules,
    top_score: u32,
    rule: QualityRule,
    // The offset used when the table search meets blank scores.
    fallback_delta: Option<f64>,
}

fn validate_rules(rules: &ElectionRules, allow_fallback: bool) -> OptprResult<ValidatedRules> {
    let num_winners = match read_js_int(&Some(rules.number_of_winners.clone())) {
        Ok(x) if x >= 1 => x as u32,
        x => whatever!("Failed to understand numberOfWinners option: {:?}", x.ok()),
    };
    let rule = match rules.quality_rule.as_deref() {
        None | Some("fsimmons") => QualityRule::Fsimmons,
        Some("harmonic") => QualityRule::Harmonic,
        Some(x) => whatever!("Unknown quality rule {:?}", x),
    };
    let top_score = match rules.top_score {
        None | Some(JSValue::Null) => 1,
        _ => read_js_int(&rules.top_score)? as u32,
    };
    ensure_whatever!(
        (1..BLANK_SCORE as u32).contains(&top_score),
        "topScore must be between 1 and {}, got {}",
        BLANK_SCORE as u32 - 1,
        top_score
    );
    let delta = match rules.delta {
        None | Some(JSValue::Null) => SearchRules::DEFAULT_DELTA,
        _ => read_js_float(&rules.delta)?,
    };
    ensure_whatever!(
        0.0 < delta && delta <= 2.0,
        "delta must be in (0, 2], got {}",
        delta
    );
    let mode = match rules.search_mode.as_deref() {
        None | Some("table") => SearchMode::Table(rule),
        Some("offset") if rule == QualityRule::Fsimmons => SearchMode::Offset { delta },
        Some("offset") => whatever!("The offset search only supports the fsimmons quality rule"),
        Some(x) => whatever!("Unknown search mode {:?}", x),
    };
    Ok(ValidatedRules {
        search: SearchRules { num_winners, mode },
        top_score,
        rule,
        fallback_delta: if allow_fallback { Some(delta) } else { None },
    })
}

/// Overrides the rules of a configuration with the command line options.
fn rules_with_overrides(rules: &ElectionRules, args: &Args) -> ElectionRules {
    let mut res = rules.clone();
    if let Some(w) = args.winners {
        res.number_of_winners = json!(w);
    }
    if let Some(r) = &args.quality_rule {
        res.quality_rule = Some(r.clone());
    }
    if let Some(m) = &args.mode {
        res.search_mode = Some(m.clone());
    }
    if let Some(t) = args.top_score {
        res.top_score = Some(json!(t));
    }
    if let Some(d) = args.delta {
        res.delta = Some(json!(d));
    }
    res
}

fn read_score_data(root_path: &Path, cfs: &FileSource) -> OptprResult<Vec<ParsedBallot>> {
    let p: PathBuf = root_path.join(&cfs.file_path);
    let p2 = p.as_path().display().to_string();
    info!("Attempting to read score file {:?}", p2);
    match cfs.provider.as_str() {
        "csv" => io_csv::read_csv_scores(p2, cfs),
        x => whatever!("Provider not implemented {:?}", x),
    }
}

fn validate_ballots(
    parsed_ballots: &[ParsedBallot],
    source: &FileSource,
    builder: &mut ScoreBuilder,
) -> OptprResult<()> {
    let blank_label = source.blank_label.as_deref();
    for pb in parsed_ballots.iter() {
        let mut scores: Vec<Option<f64>> = Vec::new();
        for s in pb.scores.iter() {
            let score = parse_score(s, blank_label).ok().context(InvalidScoreSnafu {
                lineno: pb.lineno,
                value: s.clone(),
            })?;
            scores.push(score);
        }
        debug!("Scores for ballot {:?}: {:?}", pb.id, scores);
        if pb.count == 0 {
            debug!("Skipping ballot {:?} with a count of 0", pb.id);
            continue;
        }
        builder
            .add_ballots(&scores, pb.count)
            .context(BallotSnafu { id: pb.id.clone() })?;
    }
    Ok(())
}

fn read_ballots(
    config: &ElectionConfig,
    root_path: &Path,
    rules: &ValidatedRules,
) -> OptprResult<(Vec<String>, Ballots)> {
    ensure_whatever!(
        !config.score_file_sources.is_empty(),
        "No score file source in the configuration"
    );
    let names: Vec<String> = if config.candidates.is_empty() {
        let first = &config.score_file_sources[0];
        let header_path = root_path.join(&first.file_path).display().to_string();
        io_csv::read_csv_header(&header_path, first)?
    } else {
        config.candidates.iter().map(|c| c.name.clone()).collect()
    };
    info!("Candidates: {:?}", names);

    let mut builder = ScoreBuilder::new(rules.top_score)
        .context(ElectionSnafu {})?
        .candidates(&names)
        .context(ElectionSnafu {})?;
    for cfs in config.score_file_sources.iter() {
        let parsed = read_score_data(root_path, cfs)?;
        validate_ballots(&parsed, cfs, &mut builder)?;
    }
    info!(
        "Read {} ballots for {} candidates",
        builder.num_ballots(),
        names.len()
    );

    let ballots = match rules.search.mode {
        SearchMode::Table(_) => builder.to_integer_ballots(),
        // Fractional scores are only accepted by the offset search.
        SearchMode::Offset { .. } => builder
            .to_integer_ballots()
            .or_else(|_| builder.to_real_ballots()),
    }
    .context(ElectionSnafu {})?;
    Ok((names, ballots))
}

/// Runs the search, falling back to the offset mode on blank scores if allowed.
/// Without fallback, blanks produce an empty winner set of quality 0.
fn run_search(ballots: &Ballots, rules: &ValidatedRules) -> OptprResult<(SearchResult, SearchMode)> {
    let num_winners = rules.search.num_winners;
    ensure_whatever!(
        ballots.num_ballots() > 0,
        "The election has no ballots"
    );
    ensure_whatever!(
        (num_winners as usize) < ballots.num_candidates(),
        "Cannot elect {} winners among {} candidates",
        num_winners,
        ballots.num_candidates()
    );
    match optimize(ballots, &rules.search) {
        Ok(res) => Ok((res, rules.search.mode)),
        Err(OptimizerErrors::BlankScores { stats }) => match rules.fallback_delta {
            Some(delta) => {
                warn!(
                    "Blank scores found: the table search cannot run, using the offset search (delta {}) with blanks set to the candidate averages",
                    delta
                );
                if rules.rule == QualityRule::Harmonic {
                    warn!("The offset search uses the fsimmons quality rule, not the harmonic rule");
                }
                let mode = SearchMode::Offset { delta };
                let res = optimize(ballots, &SearchRules { num_winners, mode })
                    .context(ElectionSnafu {})?;
                Ok((res, mode))
            }
            None => {
                warn!("Blank scores found and no fallback allowed: no winner set");
                Ok((
                    SearchResult {
                        quality: 0.0,
                        winners: Vec::new(),
                        subsets_searched: 0,
                        candidate_stats: stats,
                    },
                    rules.search.mode,
                ))
            }
        },
        Err(e) => Err(e).context(ElectionSnafu {}),
    }
}

fn format_score(x: f64) -> String {
    if x.fract() == 0.0 {
        format!("{}", x)
    } else {
        format!("{:.4}", x)
    }
}

fn build_summary_js(
    settings: &OutputSettings,
    names: &[String],
    res: &SearchResult,
    mode: SearchMode,
) -> JSValue {
    let c = OutputConfig {
        contest: settings.contest_name.clone(),
        date: settings.contest_date.clone(),
        jurisdiction: settings.contest_jurisdiction.clone(),
    };
    let (mode_name, rule_name) = match mode {
        SearchMode::Offset { .. } => ("offset", "fsimmons"),
        SearchMode::Table(QualityRule::Fsimmons) => ("table", "fsimmons"),
        SearchMode::Table(QualityRule::Harmonic) => ("table", "harmonic"),
    };
    let winner_names: Vec<JSValue> = res
        .winners
        .iter()
        .map(|&c| json!(names[c as usize]))
        .collect();
    let candidates: Vec<JSValue> = names
        .iter()
        .zip(res.candidate_stats.iter())
        .enumerate()
        .map(|(idx, (name, st))| {
            json!({
                "name": name,
                "sumScore": format_score(st.sum_score),
                "nonBlankCount": st.non_blank_count.to_string(),
                "averageScore": st.average().map(|a| format!("{:.4}", a)),
                "elected": res.winners.contains(&(idx as u32)),
            })
        })
        .collect();
    json!({
        "config": c,
        "results": {
            "mode": mode_name,
            "qualityRule": rule_name,
            "winners": winner_names,
            "quality": format!("{:.10}", res.quality),
            "subsetsSearched": res.subsets_searched.to_string(),
            "candidates": candidates,
        }
    })
}

fn tabulate(
    settings: &OutputSettings,
    names: &[String],
    ballots: &Ballots,
    rules: &ValidatedRules,
) -> OptprResult<JSValue> {
    let (res, mode) = run_search(ballots, rules)?;
    info!("Winners:");
    for &c in res.winners.iter() {
        info!("     {:>3} {}", c, names[c as usize]);
    }
    info!("Quality: {:.15}", res.quality);
    Ok(build_summary_js(settings, names, &res, mode))
}

/// Runs the election described by a configuration. Relative file paths are resolved
/// against `root_path`.
pub fn run_election(
    config: &ElectionConfig,
    root_path: &Path,
    allow_fallback: bool,
) -> OptprResult<JSValue> {
    let rules = validate_rules(&config.rules, allow_fallback)?;
    let (names, ballots) = read_ballots(config, root_path, &rules)?;
    tabulate(&config.output_settings, &names, &ballots, &rules)
}

fn run_demo(name: &str, args: &Args) -> OptprResult<JSValue> {
    let (names, ballots, rules) = match name {
        "pav" => {
            let (names, ballots) = demo::pav_wikipedia_election().context(ElectionSnafu {})?;
            let rules = ElectionRules {
                number_of_winners: json!(2),
                quality_rule: Some("harmonic".to_string()),
                search_mode: Some("table".to_string()),
                top_score: Some(json!(1)),
                delta: None,
                rules_description: None,
            };
            (names, ballots, rules)
        }
        "random" => {
            let mut rng = Rand48::new(demo::DEMO_SEED);
            let ballots =
                demo::random_integer_election(&mut rng, 400, 29, 9).context(ElectionSnafu {})?;
            let names: Vec<String> = (0..29).map(|c| c.to_string()).collect();
            let rules = ElectionRules {
                number_of_winners: json!(8),
                quality_rule: Some("fsimmons".to_string()),
                search_mode: Some("table".to_string()),
                top_score: Some(json!(9)),
                delta: None,
                rules_description: None,
            };
            (names, ballots, rules)
        }
        x => whatever!("Unknown demo {:?} (available: pav, random)", x),
    };
    if args.top_score.is_some() {
        warn!("Ignoring --top-score for the {} demo", name);
    }
    let mut overridden = rules_with_overrides(&rules, args);
    overridden.top_score = rules.top_score;
    let rules = validate_rules(&overridden, !args.no_fallback)?;
    let settings = OutputSettings {
        contest_name: format!("{} demo", name),
        output_directory: None,
        contest_date: None,
        contest_jurisdiction: None,
    };
    tabulate(&settings, &names, &ballots, &rules)
}

/// Prints the reference values of the quality function and the record errors of the
/// digamma approximations over `samples` random arguments.
pub fn run_psi_check(samples: u32) -> OptprResult<()> {
    println!("j   quality_accurate(j/9)  error         quality_fast(j/9)      error");
    for (j, reference) in REFERENCE_NINTHS.iter().enumerate() {
        let x = j as f64 / 9.0;
        let (a, f) = (quality_accurate(x), quality_fast(x));
        println!(
            "{}  {:19.16} {:12e}  {:19.16} {:12e}",
            j,
            a,
            a - reference,
            f,
            f - reference
        );
    }
    let mut rng = Rand48::new(demo::DEMO_SEED);
    let report = accuracy_sweep(&mut rng, samples, 0.0003, 5.0);
    println!();
    println!(
        "record error for shift-by-1 psi_fast test: {:12e} at x={:.15}",
        report.shift_by_one.error, report.shift_by_one.at
    );
    println!(
        "record error for  doubling  psi_fast test: {:12e} at x={:.15}",
        report.doubling.error, report.doubling.at
    );
    println!(
        "record error for psi_accurate-psi_fast test: {:12e} at x={:.15}",
        report.agreement.error, report.agreement.at
    );
    println!(
        "Psi function testing done ({} tests of domain {}<x<{})",
        report.samples as u64 * 3,
        report.low,
        report.high
    );
    Ok(())
}

fn check_reference(summary: &JSValue, reference_path: String) -> OptprResult<()> {
    let pretty_js_stats = serde_json::to_string_pretty(summary).context(ParsingJsonSnafu {})?;
    let summary_ref = read_summary(reference_path)?;
    info!("summary: {:?}", summary_ref);
    let pretty_js_summary_ref =
        serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
    if pretty_js_summary_ref != pretty_js_stats {
        warn!("Found differences with the reference string");
        print_diff(
            pretty_js_summary_ref.as_str(),
            pretty_js_stats.as_ref(),
            "\n",
        );
        whatever!("Difference detected between calculated summary and reference summary")
    }
    Ok(())
}

fn write_summary(summary: &JSValue, out: Option<String>) -> OptprResult<()> {
    let pretty_js_stats = serde_json::to_string_pretty(summary).context(ParsingJsonSnafu {})?;
    match out.as_deref() {
        None | Some("stdout") => println!("{}", pretty_js_stats),
        Some("") => {}
        Some(path) => {
            info!("Writing summary to {:?}", path);
            fs::write(path, pretty_js_stats).context(WritingOutputSnafu { path })?;
        }
    }
    Ok(())
}

// The configuration given with --config, or one built around --input.
fn load_config(args: &Args) -> OptprResult<(ElectionConfig, PathBuf)> {
    if let Some(config_path) = &args.config {
        let mut config = read_config(config_path)?;
        config.rules = rules_with_overrides(&config.rules, args);
        if let Some(input) = &args.input {
            config.score_file_sources = vec![FileSource::simple_csv(input, None)];
        }
        if let Some(label) = &args.blank_label {
            for cfs in config.score_file_sources.iter_mut() {
                cfs.blank_label = Some(label.clone());
            }
        }
        let root = Path::new(config_path.as_str())
            .parent()
            .context(MissingParentDirSnafu {})?
            .to_path_buf();
        return Ok((config, root));
    }
    let input = match &args.input {
        Some(x) => x.clone(),
        None => whatever!("One of --config, --input, --demo or --psi-check is required"),
    };
    ensure_whatever!(args.winners.is_some(), "--winners is required with --input");
    let empty_rules = ElectionRules {
        number_of_winners: JSValue::Null,
        quality_rule: None,
        search_mode: None,
        top_score: None,
        delta: None,
        rules_description: None,
    };
    let config = ElectionConfig {
        output_settings: OutputSettings {
            contest_name: io_common::simplify_file_name(&input),
            output_directory: None,
            contest_date: None,
            contest_jurisdiction: None,
        },
        score_file_sources: vec![FileSource::simple_csv(&input, args.blank_label.clone())],
        candidates: Vec::new(),
        rules: rules_with_overrides(&empty_rules, args),
    };
    Ok((config, PathBuf::new()))
}

pub fn run(args: &Args) -> OptprResult<()> {
    if let Some(samples) = args.psi_check {
        return run_psi_check(samples);
    }
    let (summary, out) = if let Some(name) = &args.demo {
        (run_demo(name, args)?, args.out.clone())
    } else {
        let (config, root) = load_config(args)?;
        let summary = run_election(&config, &root, !args.no_fallback)?;
        // Without --out, the summary goes to the output directory of the configuration.
        let settings = &config.output_settings;
        let out = args.out.clone().or_else(|| {
            settings.output_directory.as_ref().map(|d| {
                root.join(d)
                    .join(format!("{}_summary.json", settings.contest_name))
                    .display()
                    .to_string()
            })
        });
        (summary, out)
    };
    write_summary(&summary, out)?;
    if let Some(reference) = args.reference.clone() {
        check_reference(&summary, reference)?;
    }
    Ok(())
}

fn run_election_test(test_name: &str, config_lpath: &str, summary_lpath: &str) -> OptprResult<()> {
    let test_dir = option_env!("OPTPR_TEST_DIR")
        .unwrap_or(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/data"));
    info!("Running test {}", test_name);
    let config_path = format!("{}/{}/{}", test_dir, test_name, config_lpath);
    let config = read_config(&config_path)?;
    let root = Path::new(&config_path)
        .parent()
        .context(MissingParentDirSnafu {})?;
    let summary = run_election(&config, root, true)?;
    check_reference(
        &summary,
        format!("{}/{}/{}", test_dir, test_name, summary_lpath),
    )
}

pub fn test_wrapper(test_name: &str) {
    let res = run_election_test(
        test_name,
        format!("{}_config.json", test_name).as_str(),
        format!("{}_expected_summary.json", test_name).as_str(),
    );
    if let Err(e) = res {
        panic!("Test {} failed: {}", test_name, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn pav_wikipedia() {
        test_wrapper("pav_wikipedia");
    }

    #[test]
    fn approval_with_header_names() {
        test_wrapper("approval_with_header_names");
    }

    #[test]
    fn blank_fallback() {
        test_wrapper("blank_fallback");
    }

    #[test]
    fn offset_real_scores() {
        test_wrapper("offset_real_scores");
    }

    #[test]
    fn reference_mismatch_is_an_error() {
        let res = run_election_test(
            "pav_wikipedia",
            "pav_wikipedia_config.json",
            "../blank_fallback/blank_fallback_expected_summary.json",
        );
        assert!(res.is_err());
    }

    #[test]
    fn blanks_without_fallback_give_no_winner() {
        let test_dir = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/data/blank_fallback");
        let config = read_config(&format!("{}/blank_fallback_config.json", test_dir)).unwrap();
        let summary = run_election(&config, Path::new(test_dir), false).unwrap();
        assert_eq!(summary["results"]["quality"], json!("0.0000000000"));
        assert_eq!(summary["results"]["winners"], json!([]));
        assert_eq!(summary["results"]["mode"], json!("table"));
        assert_eq!(summary["results"]["candidates"][1]["nonBlankCount"], json!("3"));
    }

    #[test]
    fn pav_demo_with_overrides() {
        let args = Args::parse_from(["optpr", "--demo", "pav", "--winners", "1"]);
        let summary = run_demo("pav", &args).unwrap();
        // A alone is approved by 22 ballots.
        assert_eq!(summary["results"]["winners"], json!(["A"]));
        assert_eq!(summary["results"]["quality"], json!("22.0000000000"));
    }

    #[test]
    fn validates_rules() {
        let mut rules = ElectionRules {
            number_of_winners: json!("3"),
            quality_rule: Some("harmonic".to_string()),
            search_mode: Some("offset".to_string()),
            top_score: None,
            delta: None,
            rules_description: None,
        };
        assert!(validate_rules(&rules, true).is_err());
        rules.quality_rule = None;
        let v = validate_rules(&rules, true).unwrap();
        assert_eq!(v.search.num_winners, 3);
        assert_eq!(v.search.mode, SearchMode::Offset { delta: 0.5 });
        assert_eq!(v.fallback_delta, Some(0.5));
        rules.delta = Some(json!(3.0));
        assert!(validate_rules(&rules, true).is_err());
        rules.delta = None;
        rules.number_of_winners = json!(0);
        assert!(validate_rules(&rules, true).is_err());
    }
}
