pub mod incidents;
pub mod init;
pub mod run;
pub mod sweep;
