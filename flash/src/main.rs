use clap::Parser;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = flash::cli::Cli::parse();
    flash::logging::init(cli.verbose, cli.log_file.as_deref());

    match flash::run(&cli) {
        Ok(report) if report.dry_run => {
            println!(
                "🧪 Would flash {} (#{}, created {}) to {}",
                report.artifact.name,
                report.artifact.id,
                report.artifact.created_at,
                cli.directory.display()
            );
            ExitCode::SUCCESS
        }
        Ok(report) => {
            println!(
                "🎉 Flashed {} (#{}) to both halves",
                report.artifact.name, report.artifact.id
            );
            println!(
                "   {} archive downloaded",
                flash::download::format_bytes(report.archive_bytes)
            );
            for path in &report.written {
                println!("   {}", path.display());
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}
