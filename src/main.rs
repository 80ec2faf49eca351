use std::process::ExitCode;
use std::sync::Arc;

use log::{debug, error, info, warn};
use tokio::sync::RwLock;

use rust_basics::core::catalogue::render_index;
use rust_basics::core::{Command, Curriculum, CurriculumConfig, Transcript};
use rust_basics::lessons::{
    ConditionalsLesson, DataTypesLesson, ErrorHandlingLesson, FunctionsLesson, LoopsLesson,
    OverviewLesson, OwnershipLesson, PatternMatchingLesson, VariablesLesson,
};

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let args = match Command::parse(std::env::args().skip(1).collect()) {
        Command::List => {
            for line in render_index() {
                println!("{}", line);
            }
            return ExitCode::SUCCESS;
        }
        Command::Run(ids) => ids,
    };

    let config = match CurriculumConfig::load_from_env() {
        Ok(config) => config.with_cli_lessons(args),
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let unknown = config.unknown_lessons();
    if !unknown.is_empty() {
        warn!("Selection names unknown lessons: {}", unknown.join(", "));
    }

    let mut curriculum = Curriculum::new();
    curriculum.register_lesson("overview", Arc::new(RwLock::new(OverviewLesson::new())));
    curriculum.register_lesson("variables", Arc::new(RwLock::new(VariablesLesson::new())));
    curriculum.register_lesson("data_types", Arc::new(RwLock::new(DataTypesLesson::new())));
    curriculum.register_lesson("ownership", Arc::new(RwLock::new(OwnershipLesson::new())));
    curriculum.register_lesson("functions", Arc::new(RwLock::new(FunctionsLesson::new())));
    curriculum.register_lesson(
        "pattern_matching",
        Arc::new(RwLock::new(PatternMatchingLesson::new())),
    );
    curriculum.register_lesson(
        "error_handling",
        Arc::new(RwLock::new(ErrorHandlingLesson::new())),
    );
    curriculum.register_lesson("loops", Arc::new(RwLock::new(LoopsLesson::new())));
    curriculum.register_lesson(
        "conditionals",
        Arc::new(RwLock::new(ConditionalsLesson::new())),
    );
    curriculum.configure_all(&config.lesson).await;
    info!("{} lessons registered", curriculum.lesson_ids().len());

    let mut transcript = Transcript::with_echo(config.echo);
    let reports = if config.lessons.is_empty() {
        curriculum.run_all(&mut transcript).await
    } else {
        curriculum.run_selected(&config.lessons, &mut transcript).await
    };

    for report in &reports {
        debug!(
            "{} [{}] {:.1}ms, {} lines",
            report.lesson_id,
            report.run_id,
            report.duration_ms,
            report.lines.len()
        );
    }

    let status = curriculum.get_status();
    info!(
        "Finished: {} of {} lessons completed",
        status.completed_runs,
        reports.len()
    );

    for e in &status.errors {
        error!("{}", e);
    }

    ExitCode::from(status.exit_code())
}
