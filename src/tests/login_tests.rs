/// Login handshake tests
///
/// Every scenario runs against a scripted client, so the exact sequence of
/// prompts, answers and waits can be checked without a server.

#[cfg(test)]
mod login_tests {
    use crate::error::{LoginFailure, SftpError};
    use crate::expect::Step;
    use crate::models::{LoginOptions, SessionSettings, SessionState};
    use crate::tests::helpers::*;
    use crate::utils::mutex::safe_lock_or_recover;

    const HOST_KEY_PROMPT: &str = "The authenticity of host 'files.example.com (10.0.0.5)' can't be established.\r\n\
         ED25519 key fingerprint is SHA256:0bf1bd0c.\r\n\
         Are you sure you want to continue connecting (yes/no/[fingerprint])? ";
    const TERMINAL_TYPE_PROMPT: &str = "TERM environment variable not set.\r\nterminal type? ";

    fn login_failure(result: crate::Result<()>) -> LoginFailure {
        match result {
            Err(SftpError::Login(failure)) => failure,
            other => panic!("expected a login failure, got {:?}", other),
        }
    }

    // ==================== LOGIN TEST 1 ====================
    // Prompt straight away means key based auth worked: no password is sent
    #[test]
    fn test_login_with_key_sends_no_password() {
        let (mut session, transcript) =
            scripted_session(vec![out("Connected to files.example.com.\r\n"), out(PROMPT)]);

        login(&mut session).unwrap();

        assert_eq!(session.state(), SessionState::Authenticated);
        assert!(sent(&transcript).is_empty());
        assert_eq!(waits(&transcript), 1);
        assert!(!closed(&transcript));
    }

    // ==================== LOGIN TEST 2 ====================
    // Password prompt, then the prompt
    #[test]
    fn test_login_with_password() {
        let (mut session, transcript) = scripted_session(vec![
            out(PASSWORD_PROMPT),
            out("\r\nConnected to files.example.com.\r\n"),
            out(PROMPT),
        ]);

        login(&mut session).unwrap();

        assert_eq!(session.state(), SessionState::Authenticated);
        assert_eq!(sent(&transcript), vec!["secret\n"]);
        assert_eq!(waits(&transcript), 2);
    }

    // ==================== LOGIN TEST 3 ====================
    // Asked for the password twice means it was wrong
    #[test]
    fn test_repeated_password_prompt_is_refused() {
        let (mut session, transcript) = scripted_session(vec![
            out(PASSWORD_PROMPT),
            out("\r\n"),
            out(PASSWORD_PROMPT),
        ]);

        let failure = login_failure(login(&mut session));

        assert_eq!(failure, LoginFailure::PasswordRefused);
        assert_eq!(sent(&transcript), vec!["secret\n"]);
        assert!(closed(&transcript), "process must be terminated");
        assert_eq!(session.state(), SessionState::Closed);
    }

    // ==================== LOGIN TEST 4 ====================
    // Permission denied in the first phase fails without a second wait
    #[test]
    fn test_permission_denied_first_phase() {
        let (mut session, transcript) = scripted_session(vec![out(
            "alice@files.example.com: Permission denied (publickey).\r\n",
        )]);

        let failure = login_failure(login(&mut session));

        assert_eq!(failure, LoginFailure::PermissionDenied);
        assert_eq!(waits(&transcript), 1);
        assert!(sent(&transcript).is_empty());
        assert!(closed(&transcript));
        assert_eq!(session.state(), SessionState::Closed);
    }

    // ==================== LOGIN TEST 5 ====================
    // Silence is taken as a prompt the pattern did not recognise
    #[test]
    fn test_first_phase_timeout_assumes_success() {
        let (mut session, transcript) = scripted_session(vec![Step::Silence]);

        login(&mut session).unwrap();

        assert_eq!(session.state(), SessionState::Authenticated);
        assert_eq!(waits(&transcript), 1);
        assert!(!closed(&transcript));
    }

    // ==================== LOGIN TEST 6 ====================
    // Strict login turns the same silence into a failure
    #[test]
    fn test_strict_login_timeout_fails() {
        let settings = SessionSettings {
            strict_login: true,
            ..SessionSettings::default()
        };
        let (mut session, transcript) = scripted_session_with(settings, vec![Step::Silence]);

        let failure = login_failure(login(&mut session));

        assert_eq!(failure, LoginFailure::Timeout);
        assert!(closed(&transcript));
        assert_eq!(session.state(), SessionState::Closed);
    }

    // ==================== LOGIN TEST 7 ====================
    // Silence after the password is also assumed to be success
    #[test]
    fn test_second_phase_timeout_assumes_success() {
        let (mut session, transcript) =
            scripted_session(vec![out(PASSWORD_PROMPT), Step::Silence]);

        login(&mut session).unwrap();

        assert_eq!(session.state(), SessionState::Authenticated);
        assert_eq!(sent(&transcript), vec!["secret\n"]);
    }

    // ==================== LOGIN TEST 8 ====================
    // Unknown host key is accepted, then the login continues
    #[test]
    fn test_unknown_host_key_is_accepted() {
        let (mut session, transcript) = scripted_session(vec![
            out(HOST_KEY_PROMPT),
            out("\r\nWarning: Permanently added 'files.example.com' to the list of known hosts.\r\n"),
            out(PASSWORD_PROMPT),
            out(PROMPT),
        ]);

        login(&mut session).unwrap();

        assert_eq!(sent(&transcript), vec!["yes\n", "secret\n"]);
        assert_eq!(session.state(), SessionState::Authenticated);
    }

    // ==================== LOGIN TEST 9 ====================
    // Host key accepted and then the key based prompt shows up directly
    #[test]
    fn test_unknown_host_key_then_prompt() {
        let (mut session, transcript) =
            scripted_session(vec![out(HOST_KEY_PROMPT), out("\r\n"), out(PROMPT)]);

        login(&mut session).unwrap();

        assert_eq!(sent(&transcript), vec!["yes\n"]);
    }

    // ==================== LOGIN TEST 10 ====================
    #[test]
    fn test_repeated_host_key_prompt_fails() {
        let (mut session, transcript) = scripted_session(vec![
            out(HOST_KEY_PROMPT),
            out("\r\n"),
            out(HOST_KEY_PROMPT),
        ]);

        let failure = login_failure(login(&mut session));

        assert_eq!(failure, LoginFailure::RepeatedHostKeyPrompt);
        assert_eq!(sent(&transcript), vec!["yes\n"]);
        assert!(closed(&transcript));
    }

    // ==================== LOGIN TEST 11 ====================
    // Terminal type is answered with the configured value
    #[test]
    fn test_terminal_type_is_answered() {
        let (mut session, transcript) =
            scripted_session(vec![out(TERMINAL_TYPE_PROMPT), out(PROMPT)]);
        let options = LoginOptions {
            terminal_type: "vt100".to_string(),
            ..LoginOptions::default()
        };

        session
            .login("files.example.com", "alice", "", &options)
            .unwrap();

        assert_eq!(sent(&transcript), vec!["vt100\n"]);
    }

    // ==================== LOGIN TEST 12 ====================
    #[test]
    fn test_repeated_terminal_type_prompt_fails() {
        let (mut session, _transcript) = scripted_session(vec![
            out(TERMINAL_TYPE_PROMPT),
            out("\r\n"),
            out(TERMINAL_TYPE_PROMPT),
        ]);

        let failure = login_failure(login(&mut session));

        assert_eq!(failure, LoginFailure::RepeatedTerminalTypePrompt);
        assert_eq!(session.state(), SessionState::Closed);
    }

    // ==================== LOGIN TEST 13 ====================
    // A password prompt after the terminal type answer is a refusal
    #[test]
    fn test_terminal_type_then_password_is_refused() {
        let (mut session, transcript) = scripted_session(vec![
            out(TERMINAL_TYPE_PROMPT),
            out(PASSWORD_PROMPT),
            out(PROMPT),
        ]);

        let failure = login_failure(login(&mut session));

        assert_eq!(failure, LoginFailure::PasswordRefused);
        assert_eq!(sent(&transcript), vec!["ansi\n"]);
        assert!(closed(&transcript));
        assert_eq!(session.state(), SessionState::Closed);
    }

    // ==================== LOGIN TEST 14 ====================
    // Wrong password reported as permission denied after the answer
    #[test]
    fn test_permission_denied_after_password() {
        let (mut session, transcript) = scripted_session(vec![
            out(PASSWORD_PROMPT),
            out("\r\nPermission denied, please try again.\r\n"),
        ]);

        let failure = login_failure(login(&mut session));

        assert_eq!(failure, LoginFailure::PermissionDenied);
        assert!(closed(&transcript));
    }

    // ==================== LOGIN TEST 15 ====================
    #[test]
    fn test_connection_closed_by_remote_host() {
        let (mut session, _transcript) = scripted_session(vec![out(
            "Connection closed by remote host\r\n",
        )]);

        let failure = login_failure(login(&mut session));

        assert_eq!(failure, LoginFailure::ConnectionClosed);
        assert_eq!(session.state(), SessionState::Closed);
    }

    // ==================== LOGIN TEST 16 ====================
    // Client exits without printing anything recognisable
    #[test]
    fn test_client_exit_is_connection_failure() {
        let (mut session, transcript) = scripted_session(vec![
            out("ssh: Could not resolve hostname files.example.com\r\n"),
            Step::Exit,
        ]);

        let failure = login_failure(login(&mut session));

        assert_eq!(failure, LoginFailure::ConnectionFailed);
        assert!(closed(&transcript));
        assert_eq!(session.state(), SessionState::Closed);
    }

    // ==================== LOGIN TEST 17 ====================
    #[test]
    fn test_exit_after_password_is_connection_failure() {
        let (mut session, _transcript) =
            scripted_session(vec![out(PASSWORD_PROMPT), Step::Exit]);

        let failure = login_failure(login(&mut session));

        assert_eq!(failure, LoginFailure::ConnectionFailed);
    }

    // ==================== LOGIN TEST 18 ====================
    #[test]
    fn test_second_login_is_rejected() {
        let (mut session, transcript) = logged_in_session(vec![]);

        match login(&mut session) {
            Err(SftpError::AlreadyConnected) => {}
            other => panic!("expected AlreadyConnected, got {:?}", other),
        }
        assert_eq!(session.state(), SessionState::Authenticated);
        assert_eq!(safe_lock_or_recover(&transcript).spawned.len(), 1);
    }

    // ==================== LOGIN TEST 19 ====================
    // The spawned command line carries the login options
    #[test]
    fn test_spawned_command_line() {
        let (mut session, transcript) = scripted_session(vec![out(PROMPT)]);
        let options = LoginOptions {
            port: Some(2222),
            ..LoginOptions::default()
        };

        session
            .login("files.example.com", "alice", "", &options)
            .unwrap();

        let spawned = safe_lock_or_recover(&transcript).spawned.clone();
        assert_eq!(spawned.len(), 1);
        assert_eq!(spawned[0].program, "sftp");
        assert_eq!(
            spawned[0].args,
            vec!["-q", "-P", "2222", "alice@files.example.com"]
        );
    }

    // ==================== LOGIN TEST 20 ====================
    // A banner before the prompt does not confuse phase 1
    #[test]
    fn test_banner_before_prompt() {
        let (mut session, transcript) = scripted_session(vec![
            out("Welcome to the file drop. Unauthorized access is prohibited.\r\n"),
            out(PROMPT),
        ]);

        login(&mut session).unwrap();

        assert!(sent(&transcript).is_empty());
        assert_eq!(session.state(), SessionState::Authenticated);
    }

    // ==================== LOGIN TEST 21 ====================
    // A terminal type question after the password is not answered
    #[test]
    fn test_password_then_terminal_type_fails() {
        let (mut session, transcript) = scripted_session(vec![
            out(PASSWORD_PROMPT),
            out("\r\n"),
            out(TERMINAL_TYPE_PROMPT),
        ]);

        let failure = login_failure(login(&mut session));

        assert_eq!(failure, LoginFailure::RepeatedTerminalTypePrompt);
        assert_eq!(sent(&transcript), vec!["secret\n"]);
        assert!(closed(&transcript));
    }
}
