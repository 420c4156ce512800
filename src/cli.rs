// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, crate_version};

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .help("Print one JSON object per line"),
    )
}

pub fn build_cli() -> Command {
    Command::new("tallybook")
        .version(crate_version!())
        .about("Append-only personal finance ledger with correction chains and monthly rollups")
        .subcommand(Command::new("init").about("Create the database and schema"))
        .subcommand(
            Command::new("account")
                .about("Manage accounts")
                .subcommand(
                    Command::new("add")
                        .about("Add an account")
                        .arg(Arg::new("name").required(true))
                        .arg(
                            Arg::new("type")
                                .long("type")
                                .value_parser(["Asset", "Liability"])
                                .default_value("Asset"),
                        )
                        .arg(Arg::new("currency").long("currency").default_value("USD"))
                        .arg(Arg::new("balance").long("balance").default_value("0")),
                )
                .subcommand(json_flags(Command::new("list").about("List accounts")))
                .subcommand(
                    Command::new("rm")
                        .about("Delete an account (blocked while ACTIVE transactions exist)")
                        .arg(Arg::new("name").required(true)),
                ),
        )
        .subcommand(
            Command::new("category")
                .about("Manage the category tree")
                .subcommand(
                    Command::new("add")
                        .about("Add a category")
                        .arg(Arg::new("name").required(true))
                        .arg(Arg::new("parent").long("parent"))
                        .arg(
                            Arg::new("purpose")
                                .long("purpose")
                                .value_parser(["Need", "Want", "Savings/Goal"]),
                        )
                        .arg(
                            Arg::new("nature")
                                .long("nature")
                                .value_parser(["Fixed", "Variable"]),
                        ),
                )
                .subcommand(json_flags(
                    Command::new("list").about("List categories with their paths"),
                ))
                .subcommand(
                    Command::new("move")
                        .about("Reparent a category (cycle-checked)")
                        .arg(Arg::new("name").required(true))
                        .arg(
                            Arg::new("parent")
                                .long("parent")
                                .help("New parent; omit to move to the root"),
                        ),
                )
                .subcommand(
                    Command::new("rm")
                        .about("Delete a category (blocked while children or references exist)")
                        .arg(Arg::new("name").required(true)),
                ),
        )
        .subcommand(
            Command::new("merchant")
                .about("Manage merchants")
                .subcommand(
                    Command::new("add")
                        .about("Add a merchant")
                        .arg(Arg::new("name").required(true))
                        .arg(
                            Arg::new("category")
                                .long("category")
                                .help("Default category for this merchant"),
                        ),
                )
                .subcommand(json_flags(Command::new("list").about("List merchants"))),
        )
        .subcommand(
            Command::new("tag")
                .about("Manage tags")
                .subcommand(
                    Command::new("add")
                        .about("Add a tag")
                        .arg(Arg::new("name").required(true)),
                )
                .subcommand(json_flags(Command::new("list").about("List tags"))),
        )
        .subcommand(
            Command::new("tx")
                .about("Record and inspect ledger events")
                .subcommand(tx_event_args(
                    Command::new("add").about("Record a transaction"),
                ))
                .subcommand(tx_event_args(
                    Command::new("correct")
                        .about("Supersede a transaction with a corrected one")
                        .arg(Arg::new("id").required(true).help("Transaction to revise")),
                ))
                .subcommand(
                    Command::new("void")
                        .about("Void a transaction (kept, never deleted)")
                        .arg(Arg::new("id").required(true)),
                )
                .subcommand(
                    Command::new("tip")
                        .about("Show the chain tip reached from a transaction")
                        .arg(Arg::new("id").required(true)),
                )
                .subcommand(json_flags(
                    Command::new("list")
                        .about("List transactions, oldest first")
                        .arg(Arg::new("account").long("account"))
                        .arg(Arg::new("category").long("category"))
                        .arg(
                            Arg::new("status")
                                .long("status")
                                .value_parser(["ACTIVE", "VOID", "SUPERSEDED"]),
                        )
                        .arg(Arg::new("from").long("from").help("Inclusive start date"))
                        .arg(Arg::new("to").long("to").help("Inclusive end date")),
                )),
        )
        .subcommand(
            Command::new("valuation")
                .about("Record point-in-time valuations for non-liquid accounts")
                .subcommand(
                    Command::new("add")
                        .about("Add a valuation")
                        .arg(Arg::new("account").required(true))
                        .arg(Arg::new("date").long("date").required(true))
                        .arg(Arg::new("value").long("value").required(true)),
                )
                .subcommand(json_flags(
                    Command::new("list")
                        .about("List valuations")
                        .arg(Arg::new("account").long("account")),
                )),
        )
        .subcommand(
            Command::new("goal")
                .about("Manage savings goals")
                .subcommand(
                    Command::new("add")
                        .about("Add a goal")
                        .arg(Arg::new("name").required(true))
                        .arg(Arg::new("target").long("target").required(true))
                        .arg(Arg::new("date").long("date").help("Target date")),
                )
                .subcommand(
                    Command::new("link")
                        .about("Link an account to a goal")
                        .arg(Arg::new("goal").required(true))
                        .arg(Arg::new("account").required(true)),
                )
                .subcommand(json_flags(
                    Command::new("list").about("List goals with progress"),
                )),
        )
        .subcommand(
            Command::new("summary")
                .about("Materialized monthly category summary")
                .subcommand(
                    Command::new("recompute")
                        .about("Rebuild summary rows from the ledger")
                        .arg(Arg::new("month").long("month").help("YYYY-MM"))
                        .arg(Arg::new("from").long("from").help("Range start YYYY-MM"))
                        .arg(Arg::new("to").long("to").help("Range end YYYY-MM")),
                )
                .subcommand(json_flags(
                    Command::new("show")
                        .about("Show stored summary rows for a month")
                        .arg(Arg::new("month").long("month").required(true)),
                )),
        )
        .subcommand(
            Command::new("report")
                .about("Reports")
                .subcommand(json_flags(
                    Command::new("net-worth")
                        .about("Net worth as of a date")
                        .arg(Arg::new("as-of").long("as-of").help("Defaults to now")),
                )),
        )
        .subcommand(
            Command::new("export")
                .about("Export data")
                .subcommand(
                    Command::new("transactions")
                        .about("Export transactions")
                        .arg(
                            Arg::new("format")
                                .long("format")
                                .value_parser(["csv", "json"])
                                .default_value("csv"),
                        )
                        .arg(Arg::new("out").long("out").required(true)),
                ),
        )
        .subcommand(
            Command::new("config")
                .about("Settings")
                .subcommand(
                    Command::new("base-currency")
                        .about("Show or set the base currency")
                        .arg(Arg::new("code").help("Set when given, show when omitted")),
                ),
        )
        .subcommand(Command::new("doctor").about("Check ledger and summary consistency"))
}

fn tx_event_args(cmd: Command) -> Command {
    cmd.arg(Arg::new("account").long("account").required(true))
        .arg(
            Arg::new("amount")
                .long("amount")
                .required(true)
                .help("Base-currency amount; negative for outflows"),
        )
        .arg(Arg::new("date").long("date").required(true))
        .arg(Arg::new("merchant").long("merchant"))
        .arg(Arg::new("category").long("category"))
        .arg(
            Arg::new("original-amount")
                .long("original-amount")
                .help("Amount in the original currency; defaults to --amount"),
        )
        .arg(
            Arg::new("currency")
                .long("currency")
                .help("Original currency code; defaults to the account currency"),
        )
        .arg(
            Arg::new("split")
                .long("split")
                .action(ArgAction::Append)
                .help("CATEGORY=AMOUNT; repeatable, must sum to --amount"),
        )
        .arg(
            Arg::new("tag")
                .long("tag")
                .action(ArgAction::Append)
                .help("Tag name; repeatable"),
        )
        .arg(
            Arg::new("related")
                .long("related")
                .help("Annotation link to another transaction"),
        )
}
