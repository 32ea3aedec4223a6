use std::io::{BufRead, Write, stdin, stdout};

use miette::{IntoDiagnostic, Report, Result, miette};

use rowstore::{Field, FieldKind, RegistryConfig, RowData, StoreError, TableRegistry};

const HELP: &str = "\
Commands:
  tables                              list defined tables
  define <table> <field>:<TYPE> ...   define a table (TYPE e.g. INTEGER, TEXT, BOOL, BLOB)
  submit <table> <row-json>           submit a row, e.g. {\"row_id\":\"u1\",\"data\":[{\"name\":\"age\",\"data\":30}]}
  show <table> [limit] [offset]       print rows
  activate <table> | deactivate <table>
  help | exit";

fn main() -> Result<()> {
    env_logger::init();

    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(false)
                .context_lines(3)
                .tab_width(4)
                .break_words(true)
                .build(),
        )
    }))
    .into_diagnostic()?;
    miette::set_panic_hook();

    let config = RegistryConfig::from_env()?;
    let registry = TableRegistry::with_config(config);

    let mut buf = String::new();

    let mut stdin = stdin().lock();
    let mut stdout = stdout().lock();

    writeln!(stdout, "{HELP}").into_diagnostic()?;

    loop {
        stdout.write_all("rowstore> ".as_bytes()).into_diagnostic()?;
        stdout.flush().into_diagnostic()?;

        buf.clear();
        let read = stdin
            .read_line(&mut buf)
            .map_err(|err| miette!("Input reading failed: {err}"))?;
        if read == 0 {
            break;
        }

        let input = buf.trim();
        if input.is_empty() {
            continue;
        }
        if input == "exit" {
            break;
        }

        if let Err(err) = run_command(&registry, input, &mut stdout) {
            writeln!(stdout, "{err:?}").into_diagnostic()?;
        }
    }

    writeln!(stdout, "Exiting rowstore").into_diagnostic()?;

    Ok(())
}

fn run_command(registry: &TableRegistry, input: &str, out: &mut impl Write) -> Result<()> {
    let (command, rest) = input.split_once(' ').unwrap_or((input, ""));
    let rest = rest.trim();

    match command {
        "help" => writeln!(out, "{HELP}").into_diagnostic()?,
        "tables" => {
            for name in registry.table_names() {
                let summary = registry.with_table(&name, |table| {
                    let state = if table.is_active() { "active" } else { "inactive" };
                    format!("{name} ({} rows, {state})", table.len())
                });
                if let Some(summary) = summary {
                    writeln!(out, "{summary}").into_diagnostic()?;
                }
            }
        }
        "define" => {
            let mut parts = rest.split_whitespace();
            let name = parts
                .next()
                .ok_or_else(|| miette!("usage: define <table> <field>:<TYPE> ..."))?;
            let fields = parts.map(parse_field).collect::<Result<Vec<_>>>()?;
            registry.define(name, fields).map_err(store_error)?;
            writeln!(out, "Defined {name}").into_diagnostic()?;
        }
        "submit" => {
            let (name, json) = rest
                .split_once(' ')
                .ok_or_else(|| miette!("usage: submit <table> <row-json>"))?;
            let row: RowData = serde_json::from_str(json.trim()).into_diagnostic()?;
            let row_id = row.row_id.clone();
            registry.submit(name, row).map_err(store_error)?;
            writeln!(out, "Accepted {row_id}").into_diagnostic()?;
        }
        "show" => {
            let mut parts = rest.split_whitespace();
            let name = parts
                .next()
                .ok_or_else(|| miette!("usage: show <table> [limit] [offset]"))?;
            let limit: Option<usize> = parts.next().map(str::parse).transpose().into_diagnostic()?;
            let offset: usize = parts
                .next()
                .map(str::parse)
                .transpose()
                .into_diagnostic()?
                .unwrap_or(0);

            let rows = registry.fetch(name, limit, offset).map_err(store_error)?;
            show_rows(registry, name, &rows, out)?;
        }
        "activate" | "deactivate" => {
            registry
                .set_active(rest, command == "activate")
                .map_err(store_error)?;
            writeln!(out, "{rest} {command}d").into_diagnostic()?;
        }
        other => return Err(miette!("unknown command `{other}`, try `help`")),
    }

    Ok(())
}

/// Parses `name:TYPE`, mapping the declared type the way a storage schema would.
fn parse_field(spec: &str) -> Result<Field> {
    let (name, declared) = spec
        .split_once(':')
        .ok_or_else(|| miette!("field `{spec}` must look like name:TYPE"))?;
    Ok(Field::new(name, FieldKind::from_declared(declared)))
}

fn show_rows(
    registry: &TableRegistry,
    table_name: &str,
    rows: &[RowData],
    out: &mut impl Write,
) -> Result<()> {
    let columns: Vec<String> = registry
        .with_table(table_name, |table| {
            table.fields().iter().map(|f| f.name.clone()).collect()
        })
        .unwrap_or_default();

    out.write_all(format!("{: <8}", "row_id").as_bytes())
        .into_diagnostic()?;
    for column in &columns {
        out.write_all(format!(" | {: <8}", column).as_bytes())
            .into_diagnostic()?;
    }
    out.write_all(b"\n").into_diagnostic()?;

    for row in rows {
        out.write_all(format!("{: <8}", row.row_id).as_bytes())
            .into_diagnostic()?;
        for column in &columns {
            let cell = row.get(column).map_or_else(String::new, ToString::to_string);
            out.write_all(format!(" | {: <8}", cell).as_bytes())
                .into_diagnostic()?;
        }
        out.write_all(b"\n").into_diagnostic()?;
    }

    out.flush().into_diagnostic()
}

fn store_error(err: impl Into<StoreError>) -> Report {
    Report::new(err.into())
}
