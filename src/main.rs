#[cfg(feature = "build-binary")]
fn main() -> std::process::ExitCode {
	use std::env;
	use std::io::{self, Write};
	use std::process::ExitCode;

	use ariadne::{Color, Config, IndexType, Label, Report, ReportKind, Source};
	use dicey::dice::roller::FastRand;
	use tracing_subscriber::EnvFilter;

	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
		.with_writer(io::stderr)
		.init();

	let args = env::args();
	let input = if args.len() > 1 {
		// Obtain the expression by combining all args passed to the executable, so that it can be left unquoted
		// even with spaces. The first argument is ignored since it is typically the name of the executable itself.
		args.skip(1).collect::<Vec<String>>().join(" ")
	} else {
		let mut lines = io::stdin().lines();

		// If there isn't already input available in stdin, display a prompt for it
		if lines.size_hint().1.is_none() {
			print!("Enter dice expression: ");
			let _ = io::stdout().flush();
		}

		// Grab the first line available from stdin
		match lines.next() {
			Some(Ok(line)) => line,
			Some(Err(err)) => {
				eprintln!("Unable to read input: {err}");
				return ExitCode::FAILURE;
			}
			None => {
				eprintln!("No expression given");
				return ExitCode::FAILURE;
			}
		}
	};

	let expr = match dicey::parse(&input) {
		Ok(expr) => expr,
		Err(err) => {
			// Problem spans are byte offsets into the input exactly as it was given
			for problem in err.problems {
				let _ = Report::build(ReportKind::Error, ("input", problem.span.clone()))
					.with_config(Config::default().with_index_type(IndexType::Byte))
					.with_message("Invalid dice expression")
					.with_label(
						Label::new(("input", problem.span))
							.with_message(problem.message)
							.with_color(Color::Red),
					)
					.finish()
					.eprint(("input", Source::from(input.as_str())));
			}
			return ExitCode::FAILURE;
		}
	};
	tracing::debug!(%expr, passes = expr.repeat_count(), "parsed expression");

	let mut roller = match env::var("DICEY_SEED") {
		Ok(seed) => match seed.parse() {
			Ok(seed) => FastRand::with_seed(seed),
			Err(err) => {
				eprintln!("Invalid DICEY_SEED {seed:?}: {err}");
				return ExitCode::FAILURE;
			}
		},
		Err(_) => FastRand::default(),
	};

	println!("{expr}");
	for pass in expr.passes(&mut roller) {
		match pass {
			Ok(evaled) => println!("{evaled}"),
			Err(err) => {
				eprintln!("Evaluation error: {err}");
				return ExitCode::FAILURE;
			}
		}
	}

	ExitCode::SUCCESS
}

#[cfg(not(feature = "build-binary"))]
fn main() {
	println!("Nothing to do since the build-binary feature is disabled.")
}
