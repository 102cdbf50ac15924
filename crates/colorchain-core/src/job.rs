//! Typed job description.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::naming::MarkerKey;
use crate::params::{parse_command_line, ParamMap, ParamValue, FLAG_PREFIX};
use crate::CoreError;

/// Solver program used when a queue line starts directly with a flag.
pub const DEFAULT_PROGRAM: &str = "./gc";

pub const FLAG_INSTANCE: &str = "--instance";
pub const FLAG_NB_COLORS: &str = "--nb_colors";
pub const FLAG_USE_TARGET: &str = "--use_target";
pub const FLAG_RAND_SEED: &str = "--rand_seed";
pub const FLAG_TIME_LIMIT: &str = "--time_limit";
pub const FLAG_NB_ITERATIONS: &str = "--nb_iterations";
pub const FLAG_PARAMETERS: &str = "--parameters";
pub const FLAG_OUTPUT_DIRECTORY: &str = "--output_directory";

/// One solver invocation, as read from a queue line.
///
/// A JobSpec is never mutated in place: a follow-up attempt is a new JobSpec
/// built with [`JobSpec::with_nb_colors`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSpec {
    /// Solver program (first token of the line).
    pub program: String,

    /// Instance identifier, e.g. `le450_25c`.
    pub instance: String,

    /// Target color count.
    pub nb_colors: u32,

    /// Whether the solver stops once the target is reached.
    pub use_target: Option<String>,

    pub rand_seed: u64,

    /// Wall-clock limit in seconds.
    pub time_limit: Option<u64>,

    pub nb_iterations: Option<u64>,

    /// Path to the solver's parameter file.
    pub parameters: Option<String>,

    /// `<root>/<variant>` directory the solver writes its artifacts to.
    pub output_directory: String,

    /// Flags this type does not model, in their original order.
    #[serde(skip)]
    pub extra: ParamMap,
}

impl JobSpec {
    /// Parse a raw queue line.
    pub fn parse_line(line: &str) -> Result<Self, CoreError> {
        let program = line
            .split_whitespace()
            .next()
            .filter(|token| !token.starts_with(FLAG_PREFIX))
            .unwrap_or(DEFAULT_PROGRAM)
            .to_string();
        Self::from_params(program, parse_command_line(line)?)
    }

    /// Build a typed job from an already decoded parameter map.
    pub fn from_params(program: impl Into<String>, mut params: ParamMap) -> Result<Self, CoreError> {
        let instance = take_text(&mut params, FLAG_INSTANCE)?
            .ok_or_else(|| CoreError::MissingParameter(FLAG_INSTANCE.to_string()))?;
        let nb_colors = take_int(&mut params, FLAG_NB_COLORS)?
            .ok_or_else(|| CoreError::MissingParameter(FLAG_NB_COLORS.to_string()))?;
        let nb_colors = u32::try_from(nb_colors).map_err(|_| CoreError::InvalidParameter {
            flag: FLAG_NB_COLORS.to_string(),
            value: nb_colors.to_string(),
        })?;
        let rand_seed = take_int(&mut params, FLAG_RAND_SEED)?
            .ok_or_else(|| CoreError::MissingParameter(FLAG_RAND_SEED.to_string()))?;
        let output_directory = take_text(&mut params, FLAG_OUTPUT_DIRECTORY)?
            .ok_or_else(|| CoreError::MissingParameter(FLAG_OUTPUT_DIRECTORY.to_string()))?;

        Ok(Self {
            program: program.into(),
            instance,
            nb_colors,
            use_target: take_text(&mut params, FLAG_USE_TARGET)?,
            rand_seed,
            time_limit: take_int(&mut params, FLAG_TIME_LIMIT)?,
            nb_iterations: take_int(&mut params, FLAG_NB_ITERATIONS)?,
            parameters: take_text(&mut params, FLAG_PARAMETERS)?,
            output_directory,
            extra: params,
        })
    }

    /// Same job with a different color budget.
    pub fn with_nb_colors(&self, nb_colors: u32) -> Self {
        Self {
            nb_colors,
            ..self.clone()
        }
    }

    /// Experiment variant: the last component of the output directory.
    pub fn variant(&self) -> &str {
        Path::new(self.output_directory.trim_end_matches('/'))
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(&self.output_directory)
    }

    /// Marker key of this attempt.
    pub fn marker_key(&self) -> MarkerKey {
        MarkerKey::new(&self.instance, self.rand_seed, self.nb_colors, self.variant())
    }

    /// Serialize back to a single queue line (no trailing newline).
    pub fn to_command_line(&self) -> String {
        let mut tokens: Vec<String> = vec![self.program.clone()];
        let mut push = |flag: &str, value: String| {
            tokens.push(flag.to_string());
            tokens.push(value);
        };

        push(FLAG_INSTANCE, self.instance.clone());
        push(FLAG_NB_COLORS, self.nb_colors.to_string());
        if let Some(use_target) = &self.use_target {
            push(FLAG_USE_TARGET, use_target.clone());
        }
        push(FLAG_RAND_SEED, self.rand_seed.to_string());
        if let Some(time_limit) = self.time_limit {
            push(FLAG_TIME_LIMIT, time_limit.to_string());
        }
        if let Some(nb_iterations) = self.nb_iterations {
            push(FLAG_NB_ITERATIONS, nb_iterations.to_string());
        }
        if let Some(parameters) = &self.parameters {
            push(FLAG_PARAMETERS, parameters.clone());
        }
        push(FLAG_OUTPUT_DIRECTORY, self.output_directory.clone());
        for (flag, value) in self.extra.iter() {
            push(flag, value.to_string());
        }

        tokens.join(" ")
    }
}

fn take_text(params: &mut ParamMap, flag: &str) -> Result<Option<String>, CoreError> {
    Ok(params.remove(flag).map(|value| value.to_string()))
}

fn take_int(params: &mut ParamMap, flag: &str) -> Result<Option<u64>, CoreError> {
    match params.remove(flag) {
        None => Ok(None),
        Some(ParamValue::Int(value)) => Ok(Some(value)),
        Some(ParamValue::Text(value)) => Err(CoreError::InvalidParameter {
            flag: flag.to_string(),
            value,
        }),
    }
}
