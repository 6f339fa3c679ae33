//! Library side of the `miasi` command line tool: the HTTP API client and
//! the helpers the subcommands share.

pub mod api_client;
pub mod config;
