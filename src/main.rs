use clap::Parser;
use miette::Result;
use mortarlab::cli::{commands, Cli, Commands};

fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior (terminate silently) for proper Unix piping.
    // Without this, piping to `head`, `grep -q`, etc. causes a panic on broken pipe.
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;
    mortarlab::logging::init(global.verbose);

    match cli.command {
        Commands::Products(args) => commands::products::run(args, &global),
        Commands::Reqs(args) => commands::reqs::run(args, &global),
        Commands::Resolve(args) => commands::resolve::run(args, &global),
        Commands::Limits(args) => commands::limits::run(args, &global),
        Commands::Fields(args) => commands::fields::run(args, &global),
        Commands::Calc(args) => commands::calc::run(args, &global),
        Commands::Completions(args) => commands::completions::run(args),
    }
}
