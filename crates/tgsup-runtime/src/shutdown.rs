//! Termination of the server's `tokio::process::Child`.

use std::io;
use std::process::ExitStatus;
use std::time::Duration;

use tokio::process::Child;

#[cfg(unix)]
use nix::sys::signal::{self, Signal};
#[cfg(unix)]
use nix::unistd::Pid;
#[cfg(unix)]
use tokio::time::timeout;

/// Terminate a child process and wait until it has been reaped.
///
/// # Strategy
/// 1. If the child already exited, return its status
/// 2. With a non-zero `grace` on Unix, send SIGTERM and wait up to `grace`
/// 3. Kill outright (SIGKILL on Unix, `TerminateProcess` on Windows)
/// 4. Wait for reaping (required to avoid zombies)
///
/// A zero `grace` skips straight to step 3.
pub async fn terminate_child(mut child: Child, grace: Duration) -> io::Result<ExitStatus> {
    if let Some(status) = child.try_wait()? {
        return Ok(status);
    }

    #[cfg(unix)]
    {
        if !grace.is_zero() {
            if let Some(status) = request_exit(&mut child, grace).await? {
                return Ok(status);
            }
        }
    }

    #[cfg(not(unix))]
    let _ = grace;

    child.kill().await?;
    child.wait().await
}

/// Send SIGTERM and wait up to `grace` for the child to exit.
#[cfg(unix)]
async fn request_exit(child: &mut Child, grace: Duration) -> io::Result<Option<ExitStatus>> {
    let Some(pid) = child.id() else {
        return child.wait().await.map(Some);
    };
    let pid = i32::try_from(pid).map_err(io::Error::other)?;

    if let Err(e) = signal::kill(Pid::from_raw(pid), Signal::SIGTERM) {
        // Process may have already exited
        if e == nix::errno::Errno::ESRCH {
            return child.wait().await.map(Some);
        }
        return Err(io::Error::other(e));
    }

    match timeout(grace, child.wait()).await {
        Ok(result) => result.map(Some),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::process::Command;
    use tokio::time::sleep;

    #[tokio::test]
    #[cfg(unix)]
    async fn terminate_kills_immediately_without_grace() {
        let child = Command::new("sleep")
            .arg("30")
            .spawn()
            .expect("failed to spawn sleep");

        let status = terminate_child(child, Duration::ZERO).await.unwrap();
        assert!(!status.success());
    }

    #[tokio::test]
    #[cfg(unix)]
    async fn terminate_responds_to_sigterm() {
        use std::os::unix::process::ExitStatusExt;

        let child = Command::new("sleep")
            .arg("30")
            .spawn()
            .expect("failed to spawn sleep");

        let status = terminate_child(child, Duration::from_secs(5)).await.unwrap();
        assert_eq!(status.signal(), Some(Signal::SIGTERM as i32));
    }

    #[tokio::test]
    #[cfg(unix)]
    async fn terminate_escalates_when_sigterm_ignored() {
        use std::os::unix::process::ExitStatusExt;

        let child = Command::new("sh")
            .arg("-c")
            .arg("trap '' TERM; sleep 30")
            .spawn()
            .expect("failed to spawn sh");

        // Let the shell install its trap before signalling
        sleep(Duration::from_millis(200)).await;

        let status = terminate_child(child, Duration::from_millis(300))
            .await
            .unwrap();
        assert_eq!(status.signal(), Some(Signal::SIGKILL as i32));
    }

    #[tokio::test]
    async fn terminate_handles_already_exited() {
        let child = Command::new("echo")
            .arg("test")
            .spawn()
            .expect("failed to spawn echo");

        // Give it time to exit
        sleep(Duration::from_millis(100)).await;

        let status = terminate_child(child, Duration::ZERO).await.unwrap();
        assert!(status.success());
    }
}
