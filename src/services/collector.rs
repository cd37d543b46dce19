use std::process::Stdio;
use std::time::{Duration, SystemTime};

use thiserror::Error;
use tokio::process::Command;

use crate::models::Pm2Process;
use crate::state::{publish_snapshot, AppState, Snapshot};

const PM2_PROGRAM: &str = "pm2";
const PM2_ARGS: &[&str] = &["jlist"];

/// Why a collection cycle produced no snapshot. Always logged and
/// swallowed by the poller; scrape handlers keep serving the previous
/// snapshot.
#[derive(Debug, Error)]
pub enum CollectError {
    #[error("`pm2 jlist` failed: {cause}\noutput: {output}")]
    Command { cause: String, output: String },
    #[error("failed to parse `pm2 jlist` JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Run one collection cycle: invoke `pm2 jlist`, parse its output, and
/// publish a fresh snapshot. On any failure the shared state is left
/// untouched.
pub async fn collect(state: &AppState, timeout: Duration) -> Result<(), CollectError> {
    collect_with_command(state, PM2_PROGRAM, PM2_ARGS, timeout).await
}

pub(crate) async fn collect_with_command(
    state: &AppState,
    program: &str,
    args: &[&str],
    timeout: Duration,
) -> Result<(), CollectError> {
    let stdout = run_command(program, args, timeout).await?;
    let processes: Vec<Pm2Process> = serde_json::from_str(&stdout)?;

    log::debug!("collected {} pm2 processes", processes.len());
    publish_snapshot(
        state,
        Snapshot {
            processes,
            last_fetch: Some(SystemTime::now()),
        },
    );
    Ok(())
}

async fn run_command(
    program: &str,
    args: &[&str],
    timeout: Duration,
) -> Result<String, CollectError> {
    let mut cmd = Command::new(program);
    cmd.args(args);
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());
    // a timed-out pm2 must not linger past the dropped future
    cmd.kill_on_drop(true);

    let output = match tokio::time::timeout(timeout, cmd.output()).await {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => {
            return Err(CollectError::Command {
                cause: e.to_string(),
                output: String::new(),
            })
        }
        Err(_) => {
            return Err(CollectError::Command {
                cause: format!("timed out after {}s", timeout.as_secs()),
                output: String::new(),
            })
        }
    };

    if !output.status.success() {
        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));
        return Err(CollectError::Command {
            cause: format!("exit status {}", output.status),
            output: combined,
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Background poll loop: one immediate best-effort collection, then one
/// per interval, forever. Collections run inline on this task, so cycles
/// never overlap; ticks that elapse while a slow `pm2 jlist` is in
/// flight are skipped rather than replayed.
pub async fn run_poller(state: AppState, interval: Duration) {
    if let Err(e) = collect(&state, interval).await {
        log::error!("initial pm2 collection failed: {e}");
    }

    let mut tick = tokio::time::interval(interval);
    tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    // the first tick fires immediately; consume it so the next collection
    // lands one full interval after the initial one
    tick.tick().await;

    loop {
        tick.tick().await;
        if let Err(e) = collect(&state, interval).await {
            log::error!("pm2 collection failed: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{current_snapshot, new_state};
    use std::sync::Arc;

    const TIMEOUT: Duration = Duration::from_secs(5);

    #[tokio::test]
    async fn successful_collection_publishes_snapshot() {
        let state = new_state();
        let json = r#"[{"pid": 42, "name": "web", "pm2_env": {"status": "online"}}]"#;

        collect_with_command(&state, "echo", &[json], TIMEOUT)
            .await
            .unwrap();

        let snap = current_snapshot(&state);
        assert_eq!(snap.processes.len(), 1);
        assert_eq!(snap.processes[0].pid, 42);
        assert_eq!(snap.processes[0].pm2_env.status, "online");
        assert!(snap.last_fetch.is_some());
    }

    #[tokio::test]
    async fn nonzero_exit_leaves_snapshot_untouched() {
        let state = new_state();
        let json = r#"[{"pid": 1, "name": "keeper"}]"#;
        collect_with_command(&state, "echo", &[json], TIMEOUT)
            .await
            .unwrap();
        let before = current_snapshot(&state);

        let err = collect_with_command(&state, "false", &[], TIMEOUT)
            .await
            .unwrap_err();
        assert!(matches!(err, CollectError::Command { .. }));

        let after = current_snapshot(&state);
        assert!(Arc::ptr_eq(&before, &after), "failed cycle replaced the snapshot");
    }

    #[tokio::test]
    async fn missing_program_is_a_command_error() {
        let state = new_state();
        let err = collect_with_command(&state, "definitely-not-a-real-command", &[], TIMEOUT)
            .await
            .unwrap_err();
        assert!(matches!(err, CollectError::Command { .. }));
        assert!(current_snapshot(&state).last_fetch.is_none());
    }

    #[tokio::test]
    async fn malformed_json_is_a_parse_error_and_nonmutating() {
        let state = new_state();
        let err = collect_with_command(&state, "echo", &["not json at all"], TIMEOUT)
            .await
            .unwrap_err();
        assert!(matches!(err, CollectError::Parse(_)));
        assert!(current_snapshot(&state).last_fetch.is_none());
    }

    #[tokio::test]
    async fn command_error_carries_combined_output() {
        let state = new_state();
        let script = "echo some-stdout; echo some-stderr >&2; exit 3";
        let err = collect_with_command(&state, "sh", &["-c", script], TIMEOUT)
            .await
            .unwrap_err();
        match err {
            CollectError::Command { cause, output } => {
                assert!(cause.contains("exit status"));
                assert!(output.contains("some-stdout"));
                assert!(output.contains("some-stderr"));
            }
            other => panic!("expected Command error, got {other:?}"),
        }
    }
}
