//! Charity desk - command-line front end for the charity records.
//!
//! The binary parses arguments with [`cli`], signs the user in through the
//! auth service and hands each subcommand to [`commands`].

pub mod cli;
pub mod commands;
pub mod output;
