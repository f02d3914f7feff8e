/// Shared test utilities used across the login, exec, and integration test modules.

use crate::expect::{ScriptedProcess, ScriptedSpawner, Step, Transcript};
use crate::models::{LoginOptions, SessionSettings};
use crate::session::Session;
use crate::utils::mutex::safe_lock_or_recover;
use std::sync::{Arc, Mutex};

pub const PROMPT: &str = "sftp> ";
pub const PASSWORD_PROMPT: &str = "alice@files.example.com's password: ";

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("sftp_expect=debug")
        .with_test_writer()
        .try_init();
}

pub fn out(text: &str) -> Step {
    Step::Output(text.to_string())
}

/// The client echoing `command`, printing `body` and returning to its prompt.
pub fn reply(command: &str, body: &str) -> Step {
    Step::Output(format!("{}\r\n{}{}", command, body, PROMPT))
}

pub fn scripted_session(steps: Vec<Step>) -> (Session, Arc<Mutex<Transcript>>) {
    scripted_session_with(SessionSettings::default(), steps)
}

pub fn scripted_session_with(
    settings: SessionSettings,
    steps: Vec<Step>,
) -> (Session, Arc<Mutex<Transcript>>) {
    init_tracing();
    let spawner = ScriptedSpawner::new(ScriptedProcess::new(steps));
    let transcript = spawner.transcript();
    let session = Session::with_spawner(settings, spawner).unwrap();
    (session, transcript)
}

pub fn login(session: &mut Session) -> crate::Result<()> {
    session.login("files.example.com", "alice", "secret", &LoginOptions::default())
}

/// A session that has already logged in with the password "secret".
/// `steps` are what the client prints afterwards.
pub fn logged_in_session(steps: Vec<Step>) -> (Session, Arc<Mutex<Transcript>>) {
    let mut script = vec![
        out(PASSWORD_PROMPT),
        out("\r\nConnected to files.example.com.\r\n"),
        out(PROMPT),
    ];
    script.extend(steps);
    let (mut session, transcript) = scripted_session(script);
    login(&mut session).unwrap();
    (session, transcript)
}

/// Lines written to the client so far.
pub fn sent(transcript: &Arc<Mutex<Transcript>>) -> Vec<String> {
    safe_lock_or_recover(transcript).sent.clone()
}

/// Lines written to the client after the password.
pub fn commands(transcript: &Arc<Mutex<Transcript>>) -> Vec<String> {
    sent(transcript)
        .into_iter()
        .skip(1)
        .map(|line| line.trim_end_matches('\n').to_string())
        .collect()
}

pub fn waits(transcript: &Arc<Mutex<Transcript>>) -> usize {
    safe_lock_or_recover(transcript).waits
}

pub fn closed(transcript: &Arc<Mutex<Transcript>>) -> bool {
    safe_lock_or_recover(transcript).closed
}

/// Last exchange of a script. Answering it correctly shows the session is
/// still in step with the client after everything before it.
pub fn sync_reply() -> Step {
    reply("lpwd", "Local working directory: /in/step\r\n")
}

pub fn assert_in_step(session: &mut Session) {
    let output = session.exec("lpwd", &[]).unwrap();
    assert_eq!(
        output.before, "lpwd\r\nLocal working directory: /in/step\r\n",
        "session consumed output that belongs to an earlier command"
    );
}
