use anyhow::Result;
use std::sync::Arc;
use tokio::io::{self, AsyncBufReadExt, BufReader};
use tokio::sync::oneshot;
use voxplan::calendar::{Clock, SystemClock};
use voxplan::diagnostics::state;
use voxplan::dialogue::{DialogueController, DraftEmitter, SessionReply, VoiceSession};
use voxplan::reminders::{NotificationScheduler, StdoutSink};
use voxplan::speech::SilentSpeechOutput;
use voxplan::store::{EntryStore, Stores};
use voxplan::{ChatCommand, Config, VoxError, parse_command};

/// Text dialogue on stdin with the reminder scheduler ticking alongside on
/// the same runtime. Returns when stdin closes or the user quits.
pub async fn run(config: Arc<Config>) -> Result<()> {
    let locale = config.resolved_locale();
    let stores = Stores::open(&config).await?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let controller = DialogueController::for_locale(&locale, Arc::clone(&clock));
    let emitter = DraftEmitter::new(
        Arc::clone(&stores.entries),
        config.dialogue.notification_rules(),
    );
    let mut session = VoiceSession::new(controller, emitter, Arc::new(SilentSpeechOutput));

    let scheduler = NotificationScheduler::new(
        Arc::clone(&stores.entries),
        Arc::clone(&stores.firings),
        Arc::new(StdoutSink),
        clock,
    )
    .with_locale(locale.as_str());

    println!("{}", t!("chat.hint"));
    println!("{}", session.open());

    let state_writer = state::spawn_state_writer(Arc::clone(&config));
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let conversation = async {
        let result = converse(&mut session, stores.entries.as_ref()).await;
        let _ = shutdown_tx.send(());
        result
    };
    let reminders = scheduler.run(config.scheduler.tick_interval(), async {
        let _ = shutdown_rx.await;
    });

    let (result, ()) = tokio::join!(conversation, reminders);
    super::dispatch::finish_state_writer(&config, state_writer).await;
    result
}

async fn converse(session: &mut VoiceSession, entries: &dyn EntryStore) -> Result<()> {
    let stdin = io::stdin();
    let reader = BufReader::new(stdin);
    let mut lines = reader.lines();

    while let Ok(Some(line)) = lines.next_line().await {
        if !handle_line(session, entries, &line).await? {
            break;
        }
    }

    Ok(())
}

/// Handles one stdin line. Returns `false` once the user asks to quit.
///
/// Trimming only decides whether the line is blank or a slash command; the
/// dialogue receives the line as typed.
async fn handle_line(
    session: &mut VoiceSession,
    entries: &dyn EntryStore,
    line: &str,
) -> Result<bool> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(true);
    }

    match parse_command(trimmed) {
        Some(ChatCommand::Quit) => return Ok(false),
        Some(ChatCommand::Reset) => println!("{}", session.open()),
        Some(ChatCommand::Entries) => super::entries::list(entries).await?,
        Some(ChatCommand::Help) => println!("{}", t!("chat.hint")),
        None if session.controller().completed_draft().is_some() => {
            // A previous save failed; any input retries it.
            match session.flush().await {
                Ok(Some(_)) => println!("{}", session.open()),
                Ok(None) => {}
                Err(err) => report_save_failure(&err),
            }
        }
        None => match session.handle_utterance(line).await {
            Ok(reply) => print_reply(session, &reply),
            Err(err) => report_save_failure(&err),
        },
    }

    Ok(true)
}

fn print_reply(session: &mut VoiceSession, reply: &SessionReply) {
    println!("{}", reply.prompt);
    if let (Some(draft), Some(_)) = (&reply.draft, &reply.created) {
        println!(
            "{}",
            t!(
                "dialogue.saved",
                title = draft.title.as_str(),
                date = draft.date.to_string()
            )
        );
        println!("{}", session.open());
    }
}

fn report_save_failure(err: &VoxError) {
    tracing::warn!("failed to store entry: {err}");
    println!("{}", t!("chat.save_failed"));
}
