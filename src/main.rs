use clap::builder::{RangedI64ValueParser, TypedValueParser};
use clap::{ArgAction, Parser, Subcommand};
use smartsearch::error::SearchError;
use smartsearch::output::{
    json_response, AlternativeQuery, BranchResponse, ErrorResponse, GenerateResponse,
    MatchResponse, OutputFormat, ParseResponse, ParsedQuery, ReplayResponse, RuleInfo,
    RulesResponse,
};
use smartsearch::output_common::{
    format_alternative, format_match_line, format_partial_footer, format_proposed_query,
    format_total_header, is_json_format, render_json_response,
};
use smartsearch::query::{parse_basic, parse_plan, to_sexp, Basic, SearchType};
use smartsearch::replay::{Fixture, FixtureJob};
use smartsearch::smartsearch::{
    Generator, PruneOptions, Rule, SearchOutcome, SmartSearchJob, SmartSearchOptions,
    TransformError, DEFAULT_MAX_SEARCH_RESULTS_STREAMING, RULES_NARROW, RULES_WIDEN,
};
use smartsearch::streaming::{CollectingSender, SearchContext};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "SMARTSEARCH_LOG";

// Custom value parser for ranged usize - needed because clap doesn't provide RangedUsizeValueParser
fn ranged_usize(min: i64, max: i64) -> impl TypedValueParser<Value = usize> {
    let inner = RangedI64ValueParser::new().range(min..=max);
    inner.map(|v: i64| v as usize)
}

#[derive(Parser)]
#[command(
    name = "smartsearch",
    version = env!("CARGO_PKG_VERSION"),
    about = "Generate alternative code search queries for searches that find nothing"
)]
struct Cli {
    #[arg(long, global = true, default_value_t = OutputFormat::Human)]
    output: OutputFormat,

    /// Log more (-v info, -vv debug, -vvv trace). SMARTSEARCH_LOG overrides.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List generated alternatives for each branch of a query.
    #[command(after_help = GENERATE_EXAMPLES)]
    Generate {
        #[arg(long)]
        query: String,

        #[arg(long, value_enum, default_value_t = SearchType::Standard)]
        pattern_type: SearchType,

        /// Maximum alternatives listed per branch.
        #[arg(long, default_value_t = 50, value_parser = ranged_usize(1, 1000))]
        limit: usize,

        /// Generate alternatives for type:diff queries too.
        #[arg(long)]
        no_diff_clamp: bool,
    },

    /// Print the basic queries a query is planned as, with their parse trees.
    Parse {
        #[arg(long)]
        query: String,

        #[arg(long, value_enum, default_value_t = SearchType::Standard)]
        pattern_type: SearchType,
    },

    /// List the rule catalog, optionally checking each rule against a query.
    Rules {
        #[arg(long)]
        query: Option<String>,

        #[arg(long, value_enum, default_value_t = SearchType::Standard)]
        pattern_type: SearchType,
    },

    /// Run smart search against a JSON fixture of canned results.
    #[command(after_help = REPLAY_EXAMPLES)]
    Replay {
        #[arg(long)]
        query: String,

        #[arg(long)]
        fixture: PathBuf,

        #[arg(long, value_enum, default_value_t = SearchType::Standard)]
        pattern_type: SearchType,

        /// Stop running generated queries after this many results.
        #[arg(
            long,
            default_value_t = DEFAULT_MAX_SEARCH_RESULTS_STREAMING,
            value_parser = ranged_usize(1, 100_000)
        )]
        threshold: usize,

        #[arg(long)]
        no_diff_clamp: bool,
    },
}

const GENERATE_EXAMPLES: &str = r#"Examples:
  smartsearch generate --query 'go "parse error"'
  smartsearch generate --query 'https://github.com/a/b/blob/main/README.md' --output pretty
  smartsearch generate --query 'type:diff go fix' --no-diff-clamp
"#;

const REPLAY_EXAMPLES: &str = r#"Examples:
  smartsearch replay --fixture results.json --query 'go parse'

The fixture maps queries to the matches they return:
  {"results": {"lang:Go parse": [{"repository": "github.com/a/b", "path": "main.go", "line_number": 3, "preview": "parse()"}]}}
"#;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    if let Err(err) = dispatch(&cli) {
        emit_error(&cli, &err);
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn dispatch(cli: &Cli) -> Result<(), SearchError> {
    match &cli.command {
        Command::Generate {
            query,
            pattern_type,
            limit,
            no_diff_clamp,
        } => run_generate(cli, query, *pattern_type, *limit, *no_diff_clamp),
        Command::Parse {
            query,
            pattern_type,
        } => run_parse(cli, query, *pattern_type),
        Command::Rules {
            query,
            pattern_type,
        } => run_rules(cli, query.as_deref(), *pattern_type),
        Command::Replay {
            query,
            fixture,
            pattern_type,
            threshold,
            no_diff_clamp,
        } => run_replay(cli, query, fixture, *pattern_type, *threshold, *no_diff_clamp),
    }
}

fn parse_query_plan(query: &str, pattern_type: SearchType) -> Result<Vec<Basic>, SearchError> {
    if query.trim().is_empty() {
        return Err(SearchError::EmptyQuery);
    }
    Ok(parse_plan(query, pattern_type)?)
}

fn print_json<T: serde::Serialize>(cli: &Cli, data: &T, partial: bool) -> Result<(), SearchError> {
    println!("{}", render_json_response(data, partial, cli.output)?);
    Ok(())
}

fn run_generate(
    cli: &Cli,
    query: &str,
    pattern_type: SearchType,
    limit: usize,
    no_diff_clamp: bool,
) -> Result<(), SearchError> {
    let plan = parse_query_plan(query, pattern_type)?;
    let prune = PruneOptions {
        clamp_diff: !no_diff_clamp,
    };

    let mut branches = Vec::with_capacity(plan.len());
    for seed in plan {
        let seed_string = seed.string_human();
        let mut generated: Vec<AlternativeQuery> =
            Generator::with_options(seed, &RULES_NARROW, &RULES_WIDEN, &prune)
                .take(limit + 1)
                .map(|auto| AlternativeQuery {
                    description: auto.description,
                    query: auto.query.string_human(),
                })
                .collect();
        let truncated = generated.len() > limit;
        generated.truncate(limit);
        branches.push(BranchResponse {
            seed: seed_string,
            alternatives: generated,
            truncated,
        });
    }
    let total_count: u64 = branches
        .iter()
        .map(|b| b.alternatives.len() as u64)
        .sum();
    info!(total_count, branches = branches.len(), "generated alternatives");

    let response = GenerateResponse {
        query: query.to_string(),
        pattern_type: pattern_type.to_string(),
        branches,
        total_count,
    };
    if is_json_format(cli.output) {
        return print_json(cli, &response, false);
    }

    println!("{}", format_total_header(response.total_count));
    let multiple = response.branches.len() > 1;
    for branch in &response.branches {
        if multiple {
            println!("branch: {}", branch.seed);
        }
        for (i, alt) in branch.alternatives.iter().enumerate() {
            println!("{}", format_alternative(i, &alt.description, &alt.query));
        }
        if branch.truncated {
            println!("  ... more alternatives, raise --limit to see them");
        }
    }
    Ok(())
}

fn run_parse(cli: &Cli, query: &str, pattern_type: SearchType) -> Result<(), SearchError> {
    let plan = parse_query_plan(query, pattern_type)?;
    let response = ParseResponse {
        query: query.to_string(),
        pattern_type: pattern_type.to_string(),
        plan: plan
            .iter()
            .map(|basic| ParsedQuery {
                query: basic.string_human(),
                parse_tree: to_sexp(&basic.to_parse_tree()),
            })
            .collect(),
    };
    if is_json_format(cli.output) {
        return print_json(cli, &response, false);
    }

    for parsed in &response.plan {
        println!("{}", parsed.query);
        println!("  {}", parsed.parse_tree);
    }
    Ok(())
}

fn rule_info(rule: &Rule, seed: Option<&Basic>) -> Result<RuleInfo, SearchError> {
    let (applies, result) = match seed.map(|seed| rule.apply(seed)) {
        None => (None, None),
        Some(Ok(rewritten)) => (Some(true), Some(rewritten.string_human())),
        Some(Err(TransformError::NotApplicable)) => (Some(false), None),
        Some(Err(TransformError::Internal(reason))) => {
            return Err(SearchError::Transform { reason })
        }
    };
    Ok(RuleInfo {
        description: rule.description.clone(),
        applies,
        result,
    })
}

fn run_rules(cli: &Cli, query: Option<&str>, pattern_type: SearchType) -> Result<(), SearchError> {
    let seed = match query {
        Some(q) if q.trim().is_empty() => return Err(SearchError::EmptyQuery),
        Some(q) => Some(parse_basic(q, pattern_type)?),
        None => None,
    };
    let infos = |rules: &[Rule]| -> Result<Vec<RuleInfo>, SearchError> {
        rules.iter().map(|rule| rule_info(rule, seed.as_ref())).collect()
    };
    let response = RulesResponse {
        query: seed.as_ref().map(Basic::string_human),
        narrow: infos(RULES_NARROW.as_slice())?,
        widen: infos(RULES_WIDEN.as_slice())?,
    };
    if is_json_format(cli.output) {
        return print_json(cli, &response, false);
    }

    for (kind, rules) in [("narrow", &response.narrow), ("widen", &response.widen)] {
        println!("{}:", kind);
        for rule in rules {
            match (&rule.applies, &rule.result) {
                (Some(true), Some(result)) => println!("  + {} -> {}", rule.description, result),
                (Some(false), _) => println!("  - {}", rule.description),
                _ => println!("    {}", rule.description),
            }
        }
    }
    Ok(())
}

fn run_replay(
    cli: &Cli,
    query: &str,
    fixture: &Path,
    pattern_type: SearchType,
    threshold: usize,
    no_diff_clamp: bool,
) -> Result<(), SearchError> {
    let plan = parse_query_plan(query, pattern_type)?;
    let fixture = Rc::new(Fixture::from_file(fixture)?);

    // Ctrl-C stops smart search between generated queries.
    let shutdown = Arc::new(AtomicBool::new(false));
    #[cfg(unix)]
    {
        use signal_hook::consts::signal;
        use signal_hook::flag;

        let _ = flag::register(signal::SIGINT, Arc::clone(&shutdown))?;
    }
    let ctx = SearchContext::with_flag(shutdown);

    let initial = FixtureJob::for_plan(Rc::clone(&fixture), plan.clone())?;
    let options = SmartSearchOptions {
        result_threshold: threshold,
        prune: PruneOptions {
            clamp_diff: !no_diff_clamp,
        },
    };
    let job = SmartSearchJob::new(Box::new(initial), fixture.job_factory(), plan)
        .with_options(options);

    let mut sink = CollectingSender::new();
    let outcome = job.run(&ctx, &mut sink);
    let cancelled = ctx.is_cancelled();

    let alert = outcome.alert().cloned();
    let errors: Vec<ErrorResponse> = outcome.errors().into_iter().map(ErrorResponse::from).collect();
    let proposed_queries = outcome.proposed_queries().to_vec();
    if let SearchOutcome::Failed { error, .. } = outcome {
        return Err(error);
    }

    let results: Vec<MatchResponse> = sink.into_results().into_iter().map(MatchResponse::from).collect();
    let response = ReplayResponse {
        query: query.to_string(),
        total_count: results.len() as u64,
        results,
        alert,
        errors,
        proposed_queries,
    };
    if is_json_format(cli.output) {
        return print_json(cli, &response, cancelled);
    }

    println!("{}", format_total_header(response.total_count));
    for m in &response.results {
        println!("{}", format_match_line(&m.result));
    }
    if let Some(alert) = &response.alert {
        println!("alert: {}: {}", alert.title, alert.description);
    }
    for err in &response.errors {
        println!("{} [{}]: {}", err.error, err.code, err.message);
    }
    for proposed in &response.proposed_queries {
        println!("{}", format_proposed_query(proposed));
    }
    if cancelled {
        println!("{}", format_partial_footer());
    }
    Ok(())
}

fn emit_error(cli: &Cli, err: &SearchError) {
    match cli.output {
        OutputFormat::Human => {
            eprintln!("ERROR [{}]: {}", err.error_code(), err);
            if let Some(hint) = err.remediation() {
                eprintln!("Hint: {}", hint);
            }
        }
        OutputFormat::Json | OutputFormat::Pretty => {
            let response = json_response(ErrorResponse::from(err));
            let result = if matches!(cli.output, OutputFormat::Pretty) {
                serde_json::to_string_pretty(&response)
            } else {
                serde_json::to_string(&response)
            };
            match result {
                Ok(payload) => println!("{}", payload),
                Err(ser_err) => eprintln!("ERROR: {}", ser_err),
            }
        }
    }
}
