use clap::Args;
use pomodesk_core::{DataPaths, Widget};
use tokio::io::{AsyncBufReadExt, BufReader};

use super::CommandResult;
use crate::render::Renderer;

#[derive(Args)]
pub struct RunArgs {
    /// Work minutes for this run only
    #[arg(long)]
    work: Option<u32>,
    /// Break minutes for this run only
    #[arg(long = "break")]
    break_minutes: Option<u32>,
    /// Wait for input after each interval instead of starting the next one
    #[arg(long)]
    no_auto_start: bool,
    /// Print every event as a JSON line
    #[arg(long)]
    json: bool,
}

/// What the user typed on stdin.
#[derive(Debug, PartialEq, Eq)]
enum Input {
    Toggle,
    Reset,
    Quit,
    Unknown,
}

impl Input {
    fn parse(line: &str) -> Self {
        match line.trim() {
            "" | "s" | "p" | "space" => Input::Toggle,
            "r" => Input::Reset,
            "q" | "quit" | "exit" => Input::Quit,
            _ => Input::Unknown,
        }
    }
}

pub fn run(paths: DataPaths, args: RunArgs) -> CommandResult {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(run_loop(paths, args))
}

async fn run_loop(paths: DataPaths, args: RunArgs) -> CommandResult {
    let mut widget = Widget::open(paths);

    // Overrides last for this run; the saved config is left alone.
    let mut session_config = widget.config().clone();
    if let Some(work) = args.work {
        session_config.work_minutes = work;
    }
    if let Some(minutes) = args.break_minutes {
        session_config.break_minutes = minutes;
    }
    if args.no_auto_start {
        session_config.auto_start_next = false;
    }
    session_config.validate()?;
    widget.engine_mut().apply_config(&session_config);

    let renderer = Renderer::new(args.json);
    let mut events = widget.engine_mut().subscribe();
    let mut input = BufReader::new(tokio::io::stdin()).lines();

    if !args.json {
        eprintln!("enter: start/pause   r: reset   q: quit");
    }
    widget.engine_mut().start();

    loop {
        while let Ok(event) = events.try_recv() {
            renderer.render(&event, widget.theme())?;
        }

        let wait = widget.engine().time_until_next_tick();
        tokio::select! {
            _ = sleep_for(wait) => {
                widget.engine_mut().tick();
            }
            line = input.next_line() => {
                let Some(line) = line? else { break };
                let engine = widget.engine_mut();
                match Input::parse(&line) {
                    Input::Toggle if engine.is_running() => {
                        engine.pause();
                    }
                    Input::Toggle => {
                        engine.start();
                    }
                    Input::Reset => {
                        engine.reset();
                    }
                    Input::Quit => break,
                    Input::Unknown => eprintln!("unknown command: {}", line.trim()),
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    widget.shutdown(None);
    while let Ok(event) = events.try_recv() {
        renderer.render(&event, widget.theme())?;
    }
    if !args.json {
        println!();
    }
    Ok(())
}

/// Sleep until the pending tick, or forever when none is scheduled.
async fn sleep_for(wait: Option<std::time::Duration>) {
    match wait {
        Some(duration) => tokio::time::sleep(duration).await,
        None => std::future::pending().await,
    }
}
