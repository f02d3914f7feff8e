// Typed wrappers for the sftp client's interactive commands
use super::exec::command_line;
use super::Session;
use crate::error::Result;
use crate::options::{filter_flags, DF_FLAGS, LN_FLAGS, LS_FLAGS, RESUME_FLAGS, TRANSFER_FLAGS};
use crate::output::{extract, parse_df, split_entries, DiskUsage, LOCAL_PWD_PREFIX, REMOTE_PWD_PREFIX};
use crate::taxonomy::ErrorKind;

/// Flags that make `ls` print one entry per line.
const PER_LINE_FLAGS: &str = "1ln";

impl Session {
    /// Change the remote working directory.
    pub fn cd(&mut self, path: &str) -> Result<()> {
        self.exec(&command_line(&["cd", path]), &[ErrorKind::NoSuchFile])?;
        Ok(())
    }

    /// Change the group of remote `path` to `gid`.
    pub fn chgrp(&mut self, gid: u32, path: &str) -> Result<()> {
        let gid = gid.to_string();
        self.exec(
            &command_line(&["chgrp", &gid, path]),
            &[ErrorKind::PermissionDenied, ErrorKind::NoSuchFile],
        )?;
        Ok(())
    }

    /// Change the permissions of remote `path`. `mode` is sent in octal.
    pub fn chmod(&mut self, mode: u32, path: &str) -> Result<()> {
        let mode = format!("{:o}", mode);
        self.exec(
            &command_line(&["chmod", &mode, path]),
            &[ErrorKind::PermissionDenied, ErrorKind::NoSuchFile],
        )?;
        Ok(())
    }

    pub fn chown(&mut self, uid: u32, path: &str) -> Result<()> {
        let uid = uid.to_string();
        self.exec(
            &command_line(&["chown", &uid, path]),
            &[ErrorKind::PermissionDenied, ErrorKind::NoSuchFile],
        )?;
        Ok(())
    }

    /// Usage of the filesystem holding `path` (or the working directory).
    ///
    /// Needs the statvfs@openssh.com server extension. Returns `None` when
    /// the client printed fewer than two rows.
    pub fn df(&mut self, path: &str, options: &str) -> Result<Option<DiskUsage>> {
        let flags = filter_flags(DF_FLAGS, options);
        let output = self.exec(&command_line(&["df", &flags, path]), &[])?;
        let table = extract(&output.before, "\r\n")?;
        Ok(parse_df(&table))
    }

    /// Download `remote` to `local`. Accepted options: `afPpr`.
    pub fn get(&mut self, remote: &str, local: &str, options: &str) -> Result<()> {
        let flags = filter_flags(TRANSFER_FLAGS, options);
        self.exec(
            &command_line(&["get", &flags, remote, local]),
            &[
                ErrorKind::PermissionDenied,
                ErrorKind::FileNotFound,
                ErrorKind::NonRegularFile,
            ],
        )?;
        Ok(())
    }

    pub fn help(&mut self) -> Result<String> {
        self.echoed_output("help")
    }

    /// Change the local working directory.
    pub fn lcd(&mut self, path: &str) -> Result<()> {
        self.exec(
            &command_line(&["lcd", path]),
            &[
                ErrorKind::PermissionDenied,
                ErrorKind::NotADirectory,
                ErrorKind::NoSuchFile,
            ],
        )?;
        Ok(())
    }

    /// List a remote directory. Accepted options: `1afhlnrSt`.
    ///
    /// With `l`, `n` or `1` each entry is a whole line; otherwise entries
    /// are the whitespace separated names.
    pub fn ls(&mut self, path: &str, options: &str) -> Result<Vec<String>> {
        let flags = filter_flags(LS_FLAGS, options);
        let command = command_line(&["ls", &flags, path]);
        let output = self.exec(&command, &[ErrorKind::LsNotFound])?;
        let text = extract(&output.before, &format!("{}\r\n", command))?;
        Ok(split_entries(&text, per_line(&flags)))
    }

    /// List a local directory. `options` go to the local ls(1) unchanged.
    pub fn lls(&mut self, path: &str, options: &str) -> Result<Vec<String>> {
        let command = command_line(&["lls", options, path]);
        let output = self.exec(
            &command,
            &[ErrorKind::InvalidOption, ErrorKind::NoSuchFile],
        )?;
        let text = extract(&output.before, &format!("{}\r\n", command))?;
        Ok(split_entries(&text, per_line(options)))
    }

    pub fn lmkdir(&mut self, path: &str) -> Result<()> {
        self.exec(
            &command_line(&["lmkdir", path]),
            &[ErrorKind::PermissionDenied, ErrorKind::FileExists],
        )?;
        Ok(())
    }

    /// Link `new_path` to `old_path`. Only `s` (symbolic) is accepted.
    pub fn ln(&mut self, old_path: &str, new_path: &str, options: &str) -> Result<()> {
        let flags = filter_flags(LN_FLAGS, options);
        self.exec(
            &command_line(&["ln", &flags, old_path, new_path]),
            &[
                ErrorKind::PermissionDenied,
                ErrorKind::CouldNotLink,
                ErrorKind::NoSuchFile,
            ],
        )?;
        Ok(())
    }

    /// The local working directory.
    pub fn lpwd(&mut self) -> Result<String> {
        let output = self.exec("lpwd", &[])?;
        extract(output.before.trim(), LOCAL_PWD_PREFIX)
    }

    /// Set the local umask. `mask` is sent in octal.
    pub fn lumask(&mut self, mask: u32) -> Result<()> {
        let mask = format!("{:o}", mask);
        self.exec(
            &command_line(&["lumask", &mask]),
            &[ErrorKind::LumaskNotNumeric],
        )?;
        Ok(())
    }

    pub fn mkdir(&mut self, path: &str) -> Result<()> {
        self.exec(
            &command_line(&["mkdir", path]),
            &[
                ErrorKind::CreateDirectoryFailure,
                ErrorKind::PermissionDenied,
            ],
        )?;
        Ok(())
    }

    /// Toggle the client's progress meter.
    pub fn progress(&mut self) -> Result<()> {
        self.exec("progress", &[])?;
        Ok(())
    }

    /// Upload `local` to `remote`. Accepted options: `afPpr`.
    pub fn put(&mut self, local: &str, remote: &str, options: &str) -> Result<()> {
        let flags = filter_flags(TRANSFER_FLAGS, options);
        self.exec(
            &command_line(&["put", &flags, local, remote]),
            &[ErrorKind::PermissionDenied, ErrorKind::NonRegularFile],
        )?;
        Ok(())
    }

    /// The remote working directory.
    pub fn pwd(&mut self) -> Result<String> {
        let output = self.exec("pwd", &[])?;
        extract(output.before.trim(), REMOTE_PWD_PREFIX)
    }

    pub fn rename(&mut self, old_path: &str, new_path: &str) -> Result<()> {
        self.exec(
            &command_line(&["rename", old_path, new_path]),
            &[ErrorKind::NoSuchFile],
        )?;
        Ok(())
    }

    /// Resume downloading `remote` into `local`. Accepted options: `Ppr`.
    pub fn reget(&mut self, remote: &str, local: &str, options: &str) -> Result<()> {
        let flags = filter_flags(RESUME_FLAGS, options);
        self.exec(
            &command_line(&["reget", &flags, remote, local]),
            &[
                ErrorKind::PermissionDenied,
                ErrorKind::FileNotFound,
                ErrorKind::NonRegularFile,
            ],
        )?;
        Ok(())
    }

    /// Resume uploading `local` into `remote`. Accepted options: `Ppr`.
    pub fn reput(&mut self, local: &str, remote: &str, options: &str) -> Result<()> {
        let flags = filter_flags(RESUME_FLAGS, options);
        self.exec(
            &command_line(&["reput", &flags, local, remote]),
            &[ErrorKind::PermissionDenied, ErrorKind::NonRegularFile],
        )?;
        Ok(())
    }

    pub fn rm(&mut self, path: &str) -> Result<()> {
        self.exec(
            &command_line(&["rm", path]),
            &[ErrorKind::NoSuchFile, ErrorKind::DeleteFailure],
        )?;
        Ok(())
    }

    pub fn rmdir(&mut self, path: &str) -> Result<()> {
        self.exec(
            &command_line(&["rmdir", path]),
            &[ErrorKind::NoSuchFile, ErrorKind::RemoveDirectoryFailure],
        )?;
        Ok(())
    }

    pub fn symlink(&mut self, old_path: &str, new_path: &str) -> Result<()> {
        self.exec(
            &command_line(&["symlink", old_path, new_path]),
            &[
                ErrorKind::PermissionDenied,
                ErrorKind::CouldNotLink,
                ErrorKind::NoSuchFile,
            ],
        )?;
        Ok(())
    }

    /// The SFTP protocol version line.
    pub fn version(&mut self) -> Result<String> {
        self.echoed_output("version")
    }

    /// Run `command` in the local shell through `!`.
    pub fn local_command(&mut self, command: &str) -> Result<String> {
        self.echoed_output(&format!("!{}", command))
    }

    /// Run `command` and return what followed its echo.
    fn echoed_output(&mut self, command: &str) -> Result<String> {
        let output = self.exec(command, &[])?;
        extract(&output.before, &format!("{}\r\n", command))
    }
}

fn per_line(flags: &str) -> bool {
    flags.chars().any(|c| PER_LINE_FLAGS.contains(c))
}
