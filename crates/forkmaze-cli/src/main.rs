mod cli;
mod commands;
mod render;
mod session;
mod store;
mod terms;
mod theme;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, TermsName, ThemeName};
use forkmaze_core::{HintEngine, StandardTerms, Terminology};
use render::TextRenderer;
use session::Session;
use std::path::PathBuf;
use terms::NetworkTerms;
use theme::Theme;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let level = match cli.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    // Determine home directory
    let home = cli.home.unwrap_or_else(|| {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("forkmaze")
    });

    let theme = match cli.theme {
        ThemeName::Dark => Theme::dark(),
        ThemeName::Light => Theme::light(),
        ThemeName::Mono => Theme::mono(),
    };
    let terms = || -> Box<dyn Terminology> {
        match cli.terms {
            TermsName::Standard => Box::new(StandardTerms),
            TermsName::Network => Box::new(NetworkTerms),
        }
    };

    let mut session = Session::open(&home, HintEngine::with_terms(terms()));
    let mut out = TextRenderer::new(std::io::stdout(), theme, terms());
    commands::run(cli.command, &mut session, &mut out)
}
