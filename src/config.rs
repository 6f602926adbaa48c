// Copyright 2026 Tobin Edwards
//
//    Licensed under the Apache License, Version 2.0 (the "License");
//    you may not use this file except in compliance with the License.
//    You may obtain a copy of the License at
//
//        http://www.apache.org/licenses/LICENSE-2.0
//
//    Unless required by applicable law or agreed to in writing, software
//    distributed under the License is distributed on an "AS IS" BASIS,
//    WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//    See the License for the specific language governing permissions and
//    limitations under the License.

use clap::Parser;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use crate::search::Budget;

/// Chess game server: validates moves and plays the computer side.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[clap(author, version, about)]
pub struct Config {
    /// Address to listen on
    #[clap(long, env = "CHESS_HOST", default_value = "0.0.0.0")]
    pub host: IpAddr,
    /// Port to listen on
    #[clap(long, env = "CHESS_PORT", default_value = "5000")]
    pub port: u16,
    /// Maximum search depth for computer moves, in plies
    #[clap(
        long,
        env = "CHESS_SEARCH_DEPTH",
        default_value = "3",
        value_parser = clap::value_parser!(u8).range(1..=64)
    )]
    pub depth: u8,
    /// Time limit in milliseconds for each computer move
    #[clap(long, env = "CHESS_MOVETIME_MS", value_name = "MS")]
    pub movetime_ms: Option<u64>,
}

impl Config {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn budget(&self) -> Budget {
        Budget::depth(self.depth).with_movetime(self.movetime_ms.map(Duration::from_millis))
    }
}
