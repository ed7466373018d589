use clap::{Arg, Command};
use std::str::FromStr;

use minesim::logging::{self, LogConfig, LogOutput};
use minesim::report;
use minesim::scenario::{ScenarioConfig, ThreatLevel};
use minesim::simulation::SimulationEngine;

fn main() {
    // コマンドライン引数の解析
    let matches = Command::new("minesim")
        .version("0.1.0")
        .about("機雷原通過リスク評価 (Naval Mine Warfare Simulation)")
        .long_about("機雷・防潜網が敷設された海域を通過する水上艦・潜水艦の被害確率を\n\
                     モンテカルロ法で推定します。")
        .arg(
            Arg::new("scenario")
                .short('s')
                .long("scenario")
                .value_name("FILE")
                .help("シナリオファイル(.yaml)のパスを指定")
                .long_help("実行するシナリオファイル(.yaml)のパスを指定します。\n\
                           指定しない場合、標準設定で実行されます。")
        )
        .arg(
            Arg::new("threat")
                .short('t')
                .long("threat")
                .value_name("LEVEL")
                .help("脅威レベルを上書き (moderate, high, critical)")
        )
        .arg(
            Arg::new("iterations")
                .short('n')
                .long("iterations")
                .value_name("N")
                .value_parser(clap::value_parser!(u64))
                .help("試行回数を上書き")
        )
        .arg(
            Arg::new("compare")
                .short('c')
                .long("compare")
                .action(clap::ArgAction::SetTrue)
                .help("経路戦略比較も実行")
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("DIR")
                .help("結果JSONの出力先ディレクトリ")
        )
        .arg(
            Arg::new("info")
                .short('i')
                .long("info")
                .action(clap::ArgAction::SetTrue)
                .help("シナリオの情報のみ表示して終了")
        )
        .arg(
            Arg::new("log-output")
                .long("log-output")
                .value_name("TARGET")
                .default_value("console")
                .help("ログ出力先 (console, file, both)")
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .value_name("LEVEL")
                .help("ログレベル (trace, debug, info, warn, error)")
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(clap::ArgAction::Count)
                .help("詳細出力レベル (-v: 進行状況, -vv: 詳細, -vvv: 試行ごと)")
        )
        .get_matches();

    let verbose_level = matches.get_count("verbose");

    // ログの初期化
    let output = match matches.get_one::<String>("log-output").map(|s| LogOutput::from_str(s)) {
        Some(Ok(output)) => output,
        Some(Err(e)) => {
            eprintln!("エラー: {}", e);
            std::process::exit(1);
        }
        None => LogOutput::Console,
    };
    let level = matches
        .get_one::<String>("log-level")
        .map(|s| logging::parse_log_level(s))
        .unwrap_or_else(|| logging::level_for_verbosity(verbose_level));
    let log_config = LogConfig {
        level,
        output,
        ..LogConfig::default()
    };
    let _log_guard = match logging::init_logging(&log_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("エラー: ログ初期化に失敗しました: {}", e);
            std::process::exit(1);
        }
    };

    let options = RunOptions {
        scenario_path: matches.get_one::<String>("scenario").cloned(),
        threat: matches.get_one::<String>("threat").cloned(),
        iterations: matches.get_one::<u64>("iterations").copied(),
        compare: matches.get_flag("compare"),
        output_dir: matches.get_one::<String>("output").cloned(),
        info_only: matches.get_flag("info"),
        verbose_level,
    };

    if let Err(e) = run(options) {
        eprintln!("エラー: {}", e);
        std::process::exit(1);
    }
}

/// コマンドラインで指定された実行条件
struct RunOptions {
    scenario_path: Option<String>,
    threat: Option<String>,
    iterations: Option<u64>,
    compare: bool,
    output_dir: Option<String>,
    info_only: bool,
    verbose_level: u8,
}

fn run(options: RunOptions) -> Result<(), Box<dyn std::error::Error>> {
    let mut scenario = match &options.scenario_path {
        Some(path) => {
            let scenario = ScenarioConfig::from_file(path)?;
            if options.verbose_level > 0 {
                println!("シナリオファイル読み込み完了: {}", path);
            }
            scenario
        }
        None => ScenarioConfig::default(),
    };

    // コマンドラインによる上書き
    if let Some(threat) = &options.threat {
        scenario.threat = ThreatLevel::from_str(threat)?.profile();
    }
    if let Some(iterations) = options.iterations {
        scenario.sim.iterations = iterations;
    }
    if options.compare {
        scenario.routes.compare_scenarios = true;
    }
    scenario.validate()?;

    scenario.print_summary();
    println!();

    if options.info_only {
        return Ok(());
    }

    execute_scenario(scenario, options.output_dir.as_deref(), options.verbose_level)
}

/// シナリオの実行
fn execute_scenario(
    scenario: ScenarioConfig,
    output_dir: Option<&str>,
    verbose_level: u8,
) -> Result<(), Box<dyn std::error::Error>> {
    let routes = scenario.routes.clone();
    let iterations = scenario.sim.iterations;

    let engine = SimulationEngine::new(scenario, verbose_level)?;
    let results = engine.run(&routes.surface, &routes.submarine, iterations)?;
    report::print_results(&results, &engine.scenario_config);

    let comparison = if routes.compare_scenarios {
        let comparison = engine.run_scenario_comparison(&routes.submarine, routes.scenario_iterations)?;
        report::print_scenario_comparison(&comparison);
        Some(comparison)
    } else {
        None
    };

    if let Some(dir) = output_dir {
        let path = report::export_json(&results, comparison.as_ref(), &engine.scenario_config, dir)?;
        println!("✓ 保存しました: {}", path.display());
    }

    Ok(())
}
