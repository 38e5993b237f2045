use std::io::BufRead;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use engine_logging::engine_info;
use livewatch_engine::{
    EngineEvent, EngineHandle, HttpFetcher, LogSink, MergedFetcher, NotificationSink,
    SnapshotFetcher,
};

use super::config::AppConfig;
use super::console::{self, Command};

/// How often the loop wakes to drain engine events between commands.
const EVENT_POLL: Duration = Duration::from_millis(75);

pub fn run(config: AppConfig) -> anyhow::Result<()> {
    config.validate()?;
    let fetcher = build_fetcher(&config)?;
    let sinks: Vec<Arc<dyn NotificationSink>> = vec![Arc::new(LogSink)];
    let engine = EngineHandle::with_sinks(config.watch_config(), fetcher, sinks)?;

    let commands = spawn_stdin_reader();
    engine_info!("watching {} source(s)", config.sources.len());
    println!("{}", console::HELP);
    engine.start();

    loop {
        match commands.recv_timeout(EVENT_POLL) {
            Ok(Command::Quit) | Err(mpsc::RecvTimeoutError::Disconnected) => break,
            Ok(command) => apply(&engine, command),
            Err(mpsc::RecvTimeoutError::Timeout) => {}
        }
        while let Some(event) = engine.try_recv() {
            if let Some(line) = console::render_event(&event) {
                println!("{line}");
            }
        }
    }

    engine.stop();
    while let Some(event) = engine.recv_timeout(Duration::from_secs(1)) {
        if event == EngineEvent::Stopped {
            break;
        }
    }
    Ok(())
}

fn apply(engine: &EngineHandle, command: Command) {
    match command {
        Command::Pause => engine.pause(),
        Command::Resume => engine.resume(),
        Command::Toggle => {
            if console::toggle_pauses(engine.connection_state()) {
                engine.pause();
            } else {
                engine.resume();
            }
        }
        Command::Refresh => {
            println!("Refreshing data...");
            engine.force_tick();
        }
        Command::Signal(signal) => engine.signal(signal),
        Command::Status => println!("{}", console::render_status(&engine.metrics())),
        Command::Help => println!("{}", console::HELP),
        Command::Quit => {}
    }
}

fn build_fetcher(config: &AppConfig) -> anyhow::Result<Arc<dyn SnapshotFetcher>> {
    let settings = config.fetch_settings();
    let mut sources = config
        .sources
        .iter()
        .map(|url| {
            HttpFetcher::new(url, settings.clone())
                .map(|fetcher| Arc::new(fetcher) as Arc<dyn SnapshotFetcher>)
                .map_err(|err| anyhow::anyhow!("source {url}: {err}"))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    if sources.len() == 1 {
        if let Some(single) = sources.pop() {
            return Ok(single);
        }
    }
    Ok(Arc::new(MergedFetcher::new(sources)))
}

fn spawn_stdin_reader() -> mpsc::Receiver<Command> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if line.trim().is_empty() {
                continue;
            }
            match Command::parse(&line) {
                Some(command) => {
                    if tx.send(command).is_err() {
                        break;
                    }
                }
                None => eprintln!("unknown command {:?}; {}", line.trim(), console::HELP),
            }
        }
    });
    rx
}
