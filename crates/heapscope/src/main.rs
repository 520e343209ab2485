use std::error::Error;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use heapscope_core::types::MethodName;
use heapscope_core::{EnumerateOptions, HeapInspector, MemoryRuntime};
use heapscope_utils::{debug, info, init_logging_with, LogConfig, LogFormat, LogLevel};
use serde_json::{json, Value};

/// Inspect live Objective-C heaps: instances, ivars, methods and invocation.
#[derive(Parser, Debug)]
#[command(name = "heapscope")]
#[command(version)]
#[command(about = "Inspect live Objective-C heaps: instances, ivars, methods and invocation", long_about = None)]
struct Cli
{
    /// Heap dump to inspect (JSON)
    #[arg(long, global = true, value_name = "DUMP")]
    heap: Option<PathBuf>,

    /// Log level (overrides RUST_LOG)
    #[arg(long, global = true)]
    log_level: Option<LogLevel>,

    /// Log format: pretty or json (overrides HEAPSCOPE_LOG_FORMAT)
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands
{
    /// List live instances of a class and its subclasses
    Instances
    {
        /// Class name to look up in the runtime
        class: String,
        /// Include each instance's ivars
        #[arg(long, default_value_t = false)]
        ivars: bool,
        /// Decode byte buffers as UTF-8 (only with --ivars)
        #[arg(long = "to-utf8", default_value_t = false)]
        to_utf8: bool,
    },
    /// Show the ivars of an object
    Ivars
    {
        /// Object address (hex format: 0x1000 or decimal)
        pointer: String,
        /// Decode byte buffers as UTF-8
        #[arg(long = "to-utf8", default_value_t = false)]
        to_utf8: bool,
    },
    /// List the methods declared on an object's class
    Methods
    {
        /// Object address (hex format: 0x1000 or decimal)
        pointer: String,
        /// Hide selectors that take arguments
        #[arg(long, default_value_t = false)]
        without_arguments: bool,
    },
    /// Invoke a method that takes no arguments
    Execute
    {
        /// Object address (hex format: 0x1000 or decimal)
        pointer: String,
        /// Selector to send, e.g. `description` or `- description`
        method: String,
        /// Print the textual representation of the result
        #[arg(long, default_value_t = false)]
        return_string: bool,
    },
    /// Evaluate a script with the object bound as `ptr` (not sandboxed)
    Evaluate
    {
        /// Object address (hex format: 0x1000 or decimal)
        pointer: String,
        /// Script source; read from stdin when omitted
        #[arg(long, num_args = 1..)]
        inline: Vec<String>,
    },
}

fn main()
{
    let cli = Cli::parse();

    let config = LogConfig::from_env().with_level(cli.log_level).with_format(cli.log_format);
    let _guard = match init_logging_with(&config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(1);
        }
    };

    if let Err(e) = run_command(cli) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run_command(cli: Cli) -> Result<(), Box<dyn Error>>
{
    let heap = cli.heap.ok_or("no heap to inspect; pass --heap <dump.json>")?;
    info!("Loading heap dump: {}", heap.display());
    let runtime = MemoryRuntime::from_reader(BufReader::new(File::open(&heap)?))?;
    debug!(objects = runtime.object_count(), "Heap dump loaded");
    let inspector = HeapInspector::new(runtime);

    match cli.command {
        Commands::Instances { class, ivars, to_utf8 } => {
            let options = EnumerateOptions {
                include_ivars: ivars,
                decode_utf8: to_utf8,
            };
            print_json(&inspector.instances(&class, options).value)
        }
        Commands::Ivars { pointer, to_utf8 } => {
            let (class_name, ivars) = inspector.ivars(&pointer, to_utf8)?.value;
            print_json(&json!({ "className": class_name, "ivars": ivars }))
        }
        Commands::Methods {
            pointer,
            without_arguments,
        } => {
            let (class_name, methods) = inspector.methods(&pointer, without_arguments)?;
            print_json(&json!({ "className": class_name, "methods": method_rows(&class_name, &methods) }))
        }
        Commands::Execute {
            pointer,
            method,
            return_string,
        } => {
            if method.contains(':') {
                return Err(format!("{method} takes arguments; only methods without arguments can be executed").into());
            }
            print_json(&inspector.invoke(&pointer, &method, return_string)?)
        }
        Commands::Evaluate { pointer, inline } => {
            let source = if inline.is_empty() {
                io::read_to_string(io::stdin())?
            } else {
                inline.join(" ")
            };
            inspector.evaluate(&pointer, &source)?;
            Ok(())
        }
    }
}

/// Pair each method entry with its `- [Class selector]` form.
fn method_rows(class_name: &str, methods: &[String]) -> Vec<Value>
{
    methods
        .iter()
        .map(|entry| {
            let full = entry
                .parse::<MethodName>()
                .map_or_else(|_| entry.clone(), |method| method.qualified(class_name));
            json!({ "name": entry, "full": full })
        })
        .collect()
}

fn print_json(value: &impl serde::Serialize) -> Result<(), Box<dyn Error>>
{
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests
{
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition()
    {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_instances()
    {
        let cli = Cli::try_parse_from(["heapscope", "--heap", "dump.json", "instances", "Foo", "--ivars", "--to-utf8"])
            .unwrap();
        assert_eq!(cli.heap, Some(PathBuf::from("dump.json")));
        assert!(matches!(
            cli.command,
            Commands::Instances {
                ref class,
                ivars: true,
                to_utf8: true
            } if class == "Foo"
        ));
    }

    #[test]
    fn test_global_flags_after_subcommand()
    {
        let cli = Cli::try_parse_from([
            "heapscope",
            "methods",
            "0x1000",
            "--without-arguments",
            "--heap",
            "dump.json",
            "--log-level",
            "debug",
            "--log-format",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.log_level, Some(LogLevel::Debug));
        assert_eq!(cli.log_format, Some(LogFormat::Json));
        assert!(matches!(cli.command, Commands::Methods { without_arguments: true, .. }));
    }

    #[test]
    fn test_parse_execute_and_evaluate()
    {
        let cli = Cli::try_parse_from(["heapscope", "execute", "0x1000", "- description", "--return-string"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Execute { ref method, return_string: true, .. } if method == "- description"
        ));

        let cli = Cli::try_parse_from(["heapscope", "evaluate", "0x1000", "--inline", "ptr.count()", "+ 1"]).unwrap();
        assert!(matches!(cli.command, Commands::Evaluate { ref inline, .. } if inline.len() == 2));
    }

    #[test]
    fn test_method_rows_carry_full_name()
    {
        let methods = vec!["- description".to_string(), "+ sharedInstance".to_string(), "odd".to_string()];
        assert_eq!(
            method_rows("Foo", &methods),
            vec![
                json!({ "name": "- description", "full": "- [Foo description]" }),
                json!({ "name": "+ sharedInstance", "full": "+ [Foo sharedInstance]" }),
                json!({ "name": "odd", "full": "odd" }),
            ]
        );
    }

    #[test]
    fn test_rejects_bad_log_level()
    {
        assert!(Cli::try_parse_from(["heapscope", "--log-level", "loud", "instances", "Foo"]).is_err());
    }
}
