// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::utils::{get_base_currency, set_base_currency};
use crate::validate::validate_currency_code;
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    if let Some(("base-currency", sub)) = m.subcommand() {
        match sub.get_one::<String>("code") {
            Some(code) => {
                let code = code.to_uppercase();
                validate_currency_code(&code)?;
                set_base_currency(conn, &code)?;
                println!("Base currency set to {}", code);
            }
            None => println!("{}", get_base_currency(conn)?),
        }
    }
    Ok(())
}
