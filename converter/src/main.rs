use anyhow::Context;
use clap::{
    crate_authors, crate_description, crate_name, crate_version, App, AppSettings, Arg,
    ArgMatches, SubCommand,
};
use platy_help::constants::{DEFAULT_LOCALE, MARKDOWN_EXTENSION};
use platy_help::{
    markdown_reader, CommandHelp, CommandHelpMarkdownWriter, CommandTransform, JsonHost,
    MamlTransform, ModulePageWriter, PlatyError, WriterSettings,
};
use rayon::prelude::*;
use std::path::Path;

mod input;

fn output_args<'a, 'b>(subcommand: App<'a, 'b>) -> App<'a, 'b> {
    subcommand
        .arg(
            Arg::with_name("output-directory")
                .short("o")
                .long("output-directory")
                .help("Directory to write the markdown pages to")
                .required(true)
                .takes_value(true),
        )
        .arg(
            Arg::with_name("locale")
                .short("l")
                .long("locale")
                .help("Locale of the help content")
                .takes_value(true)
                .default_value(DEFAULT_LOCALE),
        )
        .arg(
            Arg::with_name("module-page")
                .short("p")
                .long("module-page")
                .help("Also write a module page, to this file or directory")
                .takes_value(true),
        )
}

fn required<'a>(matches: &'a ArgMatches, name: &str) -> anyhow::Result<&'a str> {
    matches
        .value_of(name)
        .ok_or_else(|| anyhow::anyhow!("{} is a required parameter", name))
}

/// Writes one page per command in parallel, then the optional module pages.
fn write_pages(commands: &[CommandHelp], matches: &ArgMatches) -> anyhow::Result<()> {
    let modules = group_by_module(commands);
    let module_page = match matches.value_of("module-page") {
        Some(destination) => {
            let writer = ModulePageWriter::new(WriterSettings::new(destination)?);
            check_module_pages(&writer, &modules)?;
            Some(writer)
        }
        None => None,
    };

    let output_directory = Path::new(required(matches, "output-directory")?);
    std::fs::create_dir_all(output_directory).with_context(|| {
        format!(
            "could not create directory: {}",
            output_directory.to_string_lossy()
        )
    })?;

    let failed = commands
        .par_iter()
        .filter(|help| {
            let path = output_directory.join(format!("{}.{}", help.title, MARKDOWN_EXTENSION));
            let written = WriterSettings::new(path)
                .and_then(|settings| CommandHelpMarkdownWriter::new(settings, help).write());
            match written {
                Ok(path) => {
                    log::info!("{}: wrote {}", help.title, path.to_string_lossy());
                    false
                }
                Err(e) => {
                    log::warn!("{}: {:?}", help.title, e);
                    true
                }
            }
        })
        .count();
    if failed > 0 {
        log::warn!("{} of {} pages could not be written", failed, commands.len());
    }

    if let Some(writer) = module_page {
        for module in &modules {
            writer.write(module)?;
        }
    }

    Ok(())
}

/// A `.md` destination holds a single module page, so it cannot take commands
/// from several modules.
fn check_module_pages(
    writer: &ModulePageWriter,
    modules: &[Vec<CommandHelp>],
) -> anyhow::Result<()> {
    let mut paths = Vec::new();
    for module in modules {
        let path = writer.page_path(&module[0].module_name);
        if paths.contains(&path) {
            return Err(PlatyError::ArgumentInvalid(format!(
                "{} would hold the page of more than one module, use a directory",
                path.to_string_lossy()
            ))
            .into());
        }
        paths.push(path);
    }
    Ok(())
}

/// Commands of each module, modules in order of first appearance.
fn group_by_module(commands: &[CommandHelp]) -> Vec<Vec<CommandHelp>> {
    let mut modules: Vec<Vec<CommandHelp>> = Vec::new();
    for help in commands {
        match modules
            .iter_mut()
            .find(|m| m[0].module_name == help.module_name)
        {
            Some(module) => module.push(help.clone()),
            None => modules.push(vec![help.clone()]),
        }
    }
    modules
}

fn convert_maml(matches: &ArgMatches) -> anyhow::Result<()> {
    let inputs = matches.values_of("input").into_iter().flatten();
    let files = input::collect_files(inputs, "xml");
    log::info!("Converting {} MAML files", files.len());

    let mut transform = MamlTransform::new().with_locale(required(matches, "locale")?);
    if let Some(module_name) = matches.value_of("module-name") {
        transform = transform.with_module_name(module_name);
    }

    let batch = transform.transform(&files)?;
    for (file, e) in &batch.failures {
        log::warn!("{}: skipped, {}", file.to_string_lossy(), e);
    }

    write_pages(&batch.commands, matches)
}

fn convert_commands(matches: &ArgMatches) -> anyhow::Result<()> {
    let host = JsonHost::from_file(required(matches, "snapshot")?)?;
    let patterns: Vec<&str> = matches.values_of("command").into_iter().flatten().collect();

    let commands = CommandTransform::new(&host)
        .with_locale(required(matches, "locale")?)
        .transform(patterns)?;
    log::info!("Converted {} commands", commands.len());

    write_pages(&commands, matches)
}

fn check_markdown(matches: &ArgMatches) -> anyhow::Result<()> {
    let inputs = matches.values_of("markdown").into_iter().flatten();
    let files = input::collect_files(inputs, MARKDOWN_EXTENSION);

    let failed = files
        .par_iter()
        .filter(|file| match markdown_reader::read_file(file) {
            Ok(help) => {
                log::info!(
                    "{}: {} ({} parameters, {} examples)",
                    file.to_string_lossy(),
                    help.title,
                    help.parameters().len(),
                    help.examples().len()
                );
                false
            }
            Err(e) => {
                log::warn!("{:?}", e);
                true
            }
        })
        .count();

    if failed > 0 {
        anyhow::bail!("{} of {} pages could not be read", failed, files.len());
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let matches = App::new(crate_name!())
        .version(crate_version!())
        .author(crate_authors!())
        .about(crate_description!())
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .long("verbose")
                .help("Log everything")
                .global(true),
        )
        .subcommand(output_args(
            SubCommand::with_name("maml")
                .about("Convert MAML help files to markdown")
                .arg(
                    Arg::with_name("input")
                        .short("i")
                        .long("input")
                        .help("MAML file, or directory containing MAML files")
                        .required(true)
                        .takes_value(true)
                        .multiple(true),
                )
                .arg(
                    Arg::with_name("module-name")
                        .short("m")
                        .long("module-name")
                        .help("Module name, instead of the one taken from the file name")
                        .takes_value(true),
                ),
        ))
        .subcommand(output_args(
            SubCommand::with_name("command")
                .about("Convert commands from a host metadata snapshot to markdown")
                .arg(
                    Arg::with_name("snapshot")
                        .short("s")
                        .long("snapshot")
                        .help("JSON snapshot of command metadata and help")
                        .required(true)
                        .takes_value(true),
                )
                .arg(
                    Arg::with_name("command")
                        .short("c")
                        .long("command")
                        .help("Command name, wildcards allowed")
                        .required(true)
                        .takes_value(true)
                        .multiple(true),
                ),
        ))
        .subcommand(
            SubCommand::with_name("check")
                .about("Read markdown pages back and report what was found")
                .arg(
                    Arg::with_name("markdown")
                        .short("m")
                        .long("markdown")
                        .help("Markdown file, or directory containing markdown files")
                        .required(true)
                        .takes_value(true)
                        .multiple(true),
                ),
        )
        .get_matches();

    let verbose = matches.is_present("verbose")
        || matches
            .subcommand()
            .1
            .map(|m| m.is_present("verbose"))
            .unwrap_or(false);
    let level = if verbose {
        log::LevelFilter::Trace
    } else {
        log::LevelFilter::Info
    };
    pretty_env_logger::formatted_timed_builder()
        .filter_module("platy", level)
        .filter_module("platy_help", level)
        .init();

    match matches.subcommand() {
        ("maml", Some(m)) => convert_maml(m),
        ("command", Some(m)) => convert_commands(m),
        ("check", Some(m)) => check_markdown(m),
        (name, _) => anyhow::bail!("unknown subcommand: {}", name),
    }
}
