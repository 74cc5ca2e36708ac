use std::sync::Arc;

use clap::Args;
use rateprompt_core::error::Result;
use rateprompt_core::{
    Host, Platform, PromptOutcome, RatingConfig, Requester, SqliteMedium, UrlOpener,
};
use tracing::debug;

use crate::terminal::{PrintOpener, SystemOpener, TerminalPresenter};

#[derive(Debug, Clone, Copy)]
pub enum Entry {
    Use,
    Event,
    Check,
    Show,
}

#[derive(Args, Debug)]
pub struct HostArgs {
    /// Platform whose store page to open on accept
    #[arg(long, default_value = "ios")]
    platform: Platform,
    /// iOS App Store ID (defaults to store_ids.ios from the config file)
    #[arg(long)]
    ios_id: Option<String>,
    /// Android package name (defaults to store_ids.android from the config file)
    #[arg(long)]
    android_id: Option<String>,
    /// Pre-answer dialogs with 1-based button numbers instead of reading stdin
    #[arg(long, value_delimiter = ',')]
    answers: Vec<usize>,
    /// Print the store URL instead of opening it
    #[arg(long)]
    print_url: bool,
    /// JSON output
    #[arg(long)]
    json: bool,
}

fn build_requester(args: &HostArgs) -> Result<Requester> {
    let config = RatingConfig::load()?;
    let ios_id = args
        .ios_id
        .clone()
        .unwrap_or_else(|| config.store_ids.ios.clone());
    let android_id = args
        .android_id
        .clone()
        .unwrap_or_else(|| config.store_ids.android.clone());

    let opener: Arc<dyn UrlOpener> = if args.print_url {
        Arc::new(PrintOpener)
    } else {
        Arc::new(SystemOpener)
    };
    let presenter = Arc::new(TerminalPresenter::with_answers(args.answers.iter().copied()));
    let host = Host::new(args.platform, presenter, opener);
    let medium = Arc::new(SqliteMedium::open()?);

    let requester = Requester::builder(ios_id, android_id, medium, host)
        .config(config)
        .build()?;
    let ids = requester.store_ids();
    debug!(
        platform = %args.platform,
        ios_id = ids.ios(),
        android_id = ids.android(),
        "built requester"
    );
    Ok(requester)
}

pub async fn run(entry: Entry, args: HostArgs) -> Result<()> {
    let requester = build_requester(&args)?;
    let outcome = match entry {
        Entry::Use => requester.handle_use().await?,
        Entry::Event => requester.handle_positive_event().await?,
        Entry::Check => requester.check_to_show_dialog().await?,
        Entry::Show => requester.show_rating_dialog().await?,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        println!("{}", describe(outcome));
    }
    Ok(())
}

pub async fn status(args: HostArgs) -> Result<()> {
    let requester = build_requester(&args)?;
    let status = requester.status().await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    let fmt_time = |t: Option<chrono::DateTime<chrono::Utc>>| {
        t.map(|t| t.to_rfc3339()).unwrap_or_else(|| "never".into())
    };
    println!("uses:      {}", status.snapshot.uses_count);
    println!("events:    {}", status.snapshot.event_count);
    println!("rated:     {}", fmt_time(status.snapshot.rated_at));
    println!("declined:  {}", fmt_time(status.snapshot.declined_at));
    println!("last seen: {}", fmt_time(status.snapshot.last_seen_at));
    let config = requester.config();
    println!(
        "thresholds: {} uses, {} events, {} days",
        config.uses_until_prompt, config.events_until_prompt, config.days_before_reminding
    );
    println!("decision:  {}", serde_json::to_string(&status.report)?);
    Ok(())
}

fn describe(outcome: PromptOutcome) -> &'static str {
    if !outcome.appeared() {
        return "not shown";
    }
    match outcome {
        PromptOutcome::Accepted => "accepted",
        PromptOutcome::Delayed => "delayed",
        _ => "declined",
    }
}
