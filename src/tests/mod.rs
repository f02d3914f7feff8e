// Scenario tests driven by scripted sftp clients
mod helpers;
mod login_tests;
