//! Handling the command line interface
//!
//! This module handles the command line parsing, the interactive prompting for missing values as
//! well as the formatting of the results for the console.
use std::{
    fmt::Display,
    io::{stdin, stdout, BufRead, BufReader, BufWriter, Write},
    path::PathBuf,
};

use clap::{builder::Str, Parser, Subcommand};
use rprompt::prompt_reply_from_bufread;
use strum::{EnumIter, IntoEnumIterator};

use crate::{
    beam_offset::{BeamInput, BeamResult},
    error::{SlabError, SlabResult},
    focus_shift::{FocusInput, FocusResult},
    get_version,
    spectral_color::wavelength_to_color,
    utils::format_fixed,
};

/// Number of decimal places of all printed results.
const RESULT_DECIMALS: usize = 3;

/// The calculators available from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum Calculator {
    /// lateral beam displacement by a tilted slab
    Offset,
    /// longitudinal focus shift by a slab
    Focus,
    /// color of a wavelength
    Color,
}
impl Calculator {
    const fn key(self) -> &'static str {
        match self {
            Self::Offset => "o",
            Self::Focus => "f",
            Self::Color => "c",
        }
    }
}
impl Display for Calculator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Offset => "beam offset",
            Self::Focus => "focus shift",
            Self::Color => "wavelength color",
        };
        write!(f, "{name}")
    }
}

/// A fully specified calculation.
#[derive(Debug, Clone, PartialEq)]
pub enum Task {
    /// calculate the lateral beam displacement
    Offset(BeamInput),
    /// calculate the focus shift
    Focus(FocusInput),
    /// calculate the color of the given wavelength (in nanometers)
    Color(f64),
}

/// Command line arguments after all missing values have been requested from the user.
pub struct Args {
    /// the calculation to be performed
    pub task: Task,
    /// YAML file containing the drawing layout
    pub layout: Option<PathBuf>,
    /// image file the drawing should be written to
    pub plot: Option<PathBuf>,
}

#[derive(Parser)]
#[command(author, version = Str::from(&get_version()), about, long_about = None)]
pub struct PartialArgs {
    /// calculator to be used. If not given, the user is asked for it
    #[command(subcommand)]
    calculator: Option<PartialCalculator>,

    /// YAML file defining the drawing layout. If not given, the default layout is used
    #[arg(short, long, global = true)]
    layout: Option<String>,

    /// image file (.svg or .png) the schematic drawing is written to
    #[arg(short, long, global = true)]
    plot: Option<String>,
}

/// Calculators with possibly missing input values.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum PartialCalculator {
    /// Lateral displacement of a beam passing a tilted slab
    Offset {
        /// angle of incidence in degrees
        #[arg(short, long, allow_hyphen_values = true)]
        angle: Option<String>,
        /// refractive index of the slab
        #[arg(short = 'n', long, allow_hyphen_values = true)]
        index: Option<String>,
        /// thickness of the slab in mm
        #[arg(short, long, allow_hyphen_values = true)]
        thickness: Option<String>,
        /// wavelength of the beam in nm (only used for coloring)
        #[arg(short, long, allow_hyphen_values = true)]
        wavelength: Option<String>,
    },
    /// Focus shift of a converging beam passing a slab
    Focus {
        /// refractive index of the slab
        #[arg(short = 'n', long, allow_hyphen_values = true)]
        index: Option<String>,
        /// thickness of the slab in mm
        #[arg(short, long, allow_hyphen_values = true)]
        thickness: Option<String>,
    },
    /// Perceptual color of a wavelength
    Color {
        /// wavelength in nm
        #[arg(short, long, allow_hyphen_values = true)]
        wavelength: Option<String>,
    },
}
impl From<Calculator> for PartialCalculator {
    fn from(calculator: Calculator) -> Self {
        match calculator {
            Calculator::Offset => Self::Offset {
                angle: None,
                index: None,
                thickness: None,
                wavelength: None,
            },
            Calculator::Focus => Self::Focus {
                index: None,
                thickness: None,
            },
            Calculator::Color => Self::Color { wavelength: None },
        }
    }
}

/// The values which might be requested from the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Query {
    Calculator,
    Angle,
    Index,
    Thickness,
    Wavelength,
}

/// Parse the leading number of a string.
///
/// Leading whitespace is skipped and everything after the longest valid decimal number (with
/// optional sign, fraction and exponent) is ignored, so `"2.5 mm"` yields `2.5`. `"Infinity"`
/// (optionally signed) is accepted as well. If the string does not start with a number, `NaN` is
/// returned.
#[must_use]
pub fn parse_float(input: &str) -> f64 {
    let s = input.trim_start();
    let bytes = s.as_bytes();
    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    if s[end..].starts_with("Infinity") {
        return s[..end + "Infinity".len()].parse().unwrap_or(f64::NAN);
    }
    let is_digit = |idx: usize| bytes.get(idx).is_some_and(u8::is_ascii_digit);
    let integer_start = end;
    while is_digit(end) {
        end += 1;
    }
    let mut mantissa_digits = end - integer_start;
    if bytes.get(end) == Some(&b'.') {
        let mut fraction_end = end + 1;
        while is_digit(fraction_end) {
            fraction_end += 1;
        }
        mantissa_digits += fraction_end - end - 1;
        if mantissa_digits > 0 {
            end = fraction_end;
        }
    }
    if mantissa_digits == 0 {
        return f64::NAN;
    }
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exponent_end = end + 1;
        if matches!(bytes.get(exponent_end), Some(b'+' | b'-')) {
            exponent_end += 1;
        }
        let exponent_start = exponent_end;
        while is_digit(exponent_end) {
            exponent_end += 1;
        }
        if exponent_end > exponent_start {
            end = exponent_end;
        }
    }
    s[..end].parse().unwrap_or(f64::NAN)
}

/// Evaluates the input for a numeric value.
/// # Returns
/// * `None` if the input is empty. The user is asked again in this case.
/// * the parsed number otherwise. Text not starting with a number yields `NaN` which is rejected
///   later on by the calculation engines.
fn eval_number_input(input: &str) -> Option<f64> {
    (!input.trim().is_empty()).then(|| parse_float(input))
}

/// Evaluates if the passed calculator string is valid.
/// # Returns
/// * [`Option<Calculator>`] depending on the input
/// * None if the calculator string is invalid
fn eval_calculator_input(calculator_input: &str) -> Option<Calculator> {
    Calculator::iter().find(|c| c.key() == calculator_input.trim())
}

/// Creates the prompt string that is displayed in the console for the given query.
/// # Attributes
/// * `query`:      the requested value
/// * `init_str`:   Prepended String. Used if some messages should be displayed beforehand.
fn create_prompt_str(query: Query, init_str: &str) -> String {
    let mut prompt_str = init_str.to_owned();
    match query {
        Query::Calculator => {
            prompt_str += "Please choose a calculator:\n";
            for calculator in Calculator::iter() {
                prompt_str += &format!("{} for {calculator}\n", calculator.key());
            }
            prompt_str
        }
        Query::Angle => prompt_str + "Please insert the angle of incidence in degrees:\n",
        Query::Index => prompt_str + "Please insert the refractive index of the slab:\n",
        Query::Thickness => prompt_str + "Please insert the thickness of the slab in mm:\n",
        Query::Wavelength => prompt_str + "Please insert the wavelength in nm:\n",
    }
}

/// Extracts an argument, asking the user as long as it is missing or invalid.
/// # Attributes
/// * `func`:       Function to evaluate the input string of the given argument.
/// * `input`:      String-Option of the argument
/// * `query`:      the requested value, used for creating the prompt
/// * `reader`:     Type that implements the `BufRead` trait to read from. May be stdin().lock() for user input or a `BufReader` from a static String for tests
/// * `writer`:     Type  that implements the Write trait to write into.
/// # Errors
/// Returns an [`SlabError::Console`] if the user input cannot be read (e.g. end of input).
fn get_args<T>(
    func: fn(&str) -> Option<T>,
    input: Option<&str>,
    query: Query,
    reader: &mut impl BufRead,
    writer: &mut impl Write,
) -> SlabResult<T> {
    let mut input = input.map(str::to_owned);
    let mut init_str = "";
    loop {
        if let Some(i) = input.as_deref() {
            if let Some(arg) = func(i) {
                return Ok(arg);
            }
            init_str = "Invalid input!\n";
        }
        let reply = prompt_reply_from_bufread(reader, writer, create_prompt_str(query, init_str))
            .map_err(|e| SlabError::Console(format!("reading user input failed: {e}")))?;
        input = Some(reply);
    }
}

fn get_number(
    input: Option<&str>,
    query: Query,
    reader: &mut impl BufRead,
    writer: &mut impl Write,
) -> SlabResult<f64> {
    get_args(eval_number_input, input, query, reader, writer)
}

impl Args {
    /// Create [`Args`] from [`PartialArgs`] by requesting all missing values from `reader`.
    ///
    /// # Errors
    ///
    /// This function returns an error if reading from `reader` fails.
    pub fn from_partial_args(
        part_args: PartialArgs,
        reader: &mut impl BufRead,
        writer: &mut impl Write,
    ) -> SlabResult<Self> {
        let calculator = match part_args.calculator {
            Some(calculator) => calculator,
            None => get_args(eval_calculator_input, None, Query::Calculator, reader, writer)?.into(),
        };
        let task = match calculator {
            PartialCalculator::Offset {
                angle,
                index,
                thickness,
                wavelength,
            } => {
                let angle = get_number(angle.as_deref(), Query::Angle, reader, writer)?;
                let index = get_number(index.as_deref(), Query::Index, reader, writer)?;
                let thickness = get_number(thickness.as_deref(), Query::Thickness, reader, writer)?;
                let wavelength =
                    get_number(wavelength.as_deref(), Query::Wavelength, reader, writer)?;
                Task::Offset(BeamInput::new(angle, index, thickness, wavelength))
            }
            PartialCalculator::Focus { index, thickness } => {
                let index = get_number(index.as_deref(), Query::Index, reader, writer)?;
                let thickness = get_number(thickness.as_deref(), Query::Thickness, reader, writer)?;
                Task::Focus(FocusInput::new(index, thickness))
            }
            PartialCalculator::Color { wavelength } => Task::Color(get_number(
                wavelength.as_deref(),
                Query::Wavelength,
                reader,
                writer,
            )?),
        };
        Ok(Self {
            task,
            layout: part_args.layout.map(PathBuf::from),
            plot: part_args.plot.map(PathBuf::from),
        })
    }
}

impl TryFrom<PartialArgs> for Args {
    type Error = SlabError;

    fn try_from(part_args: PartialArgs) -> SlabResult<Self> {
        let mut reader = BufReader::new(stdin().lock());
        let mut writer = BufWriter::new(stdout().lock());
        //intro only shown when neither the help, nor the version flag is specified
        show_intro();
        Self::from_partial_args(part_args, &mut reader, &mut writer)
    }
}

/// Creates the console output of a beam offset calculation.
///
/// An error is reported by its message instead of the numbers.
#[must_use]
pub fn beam_report(result: &SlabResult<BeamResult>) -> String {
    match result {
        Ok(r) => format!(
            "Lateral displacement: {} mm\nRefraction angle: {}°",
            format_fixed(r.lateral_displacement_mm(), RESULT_DECIMALS),
            format_fixed(r.refracted_angle_rad().to_degrees(), RESULT_DECIMALS)
        ),
        Err(e) => format!("Lateral displacement: {e}"),
    }
}

/// Creates the console output of a focus shift calculation.
///
/// An error is reported by its message instead of the numbers.
#[must_use]
pub fn focus_report(result: &SlabResult<FocusResult>) -> String {
    match result {
        Ok(r) => {
            let fallback_note = if r.used_fallback() {
                " (paraxial fallback)"
            } else {
                ""
            };
            format!(
                "Focus shift (paraxial): {} mm\nFocus shift (ray trace): {} mm{fallback_note}",
                format_fixed(r.paraxial_focus_shift_mm(), RESULT_DECIMALS),
                format_fixed(r.real_focus_shift_mm(), RESULT_DECIMALS)
            )
        }
        Err(e) => format!("Focus shift: {e}"),
    }
}

/// Creates the console output of a color calculation.
#[must_use]
pub fn color_report(wavelength_nm: f64) -> String {
    format!("Color: {}", wavelength_to_color(wavelength_nm))
}

/// Creates the title banner.
#[must_use]
fn create_intro() -> String {
    format!(
        "{: ^72}\n{: ^72}\n",
        "slab_optics - beam offset and focus shift of plane-parallel slabs",
        "version ".to_owned() + &get_version()
    )
}
/// Show the title banner together with the version information.
pub fn show_intro() {
    println!("{}", create_intro());
}
