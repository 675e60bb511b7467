use std::num::IntErrorKind;

use serde::{Deserialize, Serialize};

pub const MIN_DIMENSION: usize = 5;
pub const MAX_DIMENSION: usize = 20;
pub const MIN_MINES: usize = 5;
pub const DEFAULT_WIDTH: usize = 10;
pub const DEFAULT_HEIGHT: usize = 10;
pub const DEFAULT_MINES: usize = 20;
/// Share of cells that become mines when only the dimensions are customised.
pub const MINE_RATIO: f64 = 0.23;

/// Validated board parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameParams {
    pub width: usize,
    pub height: usize,
    pub mines: usize,
    pub timed: bool,
}

impl Default for GameParams {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            mines: DEFAULT_MINES,
            timed: false,
        }
    }
}

impl GameParams {
    pub fn smallest() -> Self {
        Self {
            width: MIN_DIMENSION,
            height: MIN_DIMENSION,
            mines: MIN_MINES,
            timed: false,
        }
    }

    pub fn largest() -> Self {
        Self {
            width: MAX_DIMENSION,
            height: MAX_DIMENSION,
            mines: 100,
            timed: false,
        }
    }

    pub fn timed(self, timed: bool) -> Self {
        Self { timed, ..self }
    }

    pub fn cells(&self) -> usize {
        self.width * self.height
    }

    pub fn safe_cells(&self) -> usize {
        self.cells() - self.mines
    }

    /// Pull every field into its legal range.
    pub fn clamped(self) -> Self {
        let width = self.width.clamp(MIN_DIMENSION, MAX_DIMENSION);
        let height = self.height.clamp(MIN_DIMENSION, MAX_DIMENSION);
        let mines = self.mines.clamp(MIN_MINES, width * height - 1);
        Self {
            width,
            height,
            mines,
            timed: self.timed,
        }
    }
}

/// A raw form value: either a JSON number or whatever text the user typed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamInput {
    Number(f64),
    Text(String),
}

impl ParamInput {
    /// Leading integer, the way a browser form reads it; `None` when there
    /// are no digits up front. Runs of digits too long for `i64` saturate.
    fn as_int(&self) -> Option<i64> {
        match self {
            ParamInput::Number(n) if n.is_finite() => Some(n.trunc() as i64),
            ParamInput::Number(_) => None,
            ParamInput::Text(text) => {
                let text = text.trim_start();
                let (sign, digits) = match text.strip_prefix('-') {
                    Some(rest) => (-1, rest),
                    None => (1, text.strip_prefix('+').unwrap_or(text)),
                };
                let end = digits
                    .find(|c: char| !c.is_ascii_digit())
                    .unwrap_or(digits.len());
                match digits[..end].parse::<i64>() {
                    Ok(n) => Some(sign * n),
                    Err(e) if *e.kind() == IntErrorKind::PosOverflow => {
                        Some(if sign < 0 { i64::MIN } else { i64::MAX })
                    }
                    Err(_) => None,
                }
            }
        }
    }
}

impl From<usize> for ParamInput {
    fn from(value: usize) -> Self {
        ParamInput::Number(value as f64)
    }
}

/// Unvalidated game parameters as submitted by a player.
///
/// Nothing here is ever rejected: [`ParamsRequest::resolve`] clamps or
/// defaults every field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParamsRequest {
    pub width: Option<ParamInput>,
    pub height: Option<ParamInput>,
    pub mines: Option<ParamInput>,
    pub timed: bool,
}

impl ParamsRequest {
    pub fn resolve(&self) -> GameParams {
        let width = resolve_field(
            self.width.as_ref(),
            MIN_DIMENSION,
            MAX_DIMENSION,
            DEFAULT_WIDTH,
        );
        let height = resolve_field(
            self.height.as_ref(),
            MIN_DIMENSION,
            MAX_DIMENSION,
            DEFAULT_HEIGHT,
        );

        let default_mines = if width == DEFAULT_WIDTH && height == DEFAULT_HEIGHT {
            DEFAULT_MINES
        } else {
            ((width * height) as f64 * MINE_RATIO).floor() as usize
        };
        let mines = resolve_field(
            self.mines.as_ref(),
            MIN_MINES,
            width * height - 1,
            default_mines,
        );

        GameParams {
            width,
            height,
            mines,
            timed: self.timed,
        }
    }
}

impl From<GameParams> for ParamsRequest {
    fn from(params: GameParams) -> Self {
        Self {
            width: Some(params.width.into()),
            height: Some(params.height.into()),
            mines: Some(params.mines.into()),
            timed: params.timed,
        }
    }
}

/// Absent, zero and non-numeric input falls back to `default`.
fn resolve_field(input: Option<&ParamInput>, min: usize, max: usize, default: usize) -> usize {
    match input.and_then(ParamInput::as_int) {
        None | Some(0) => default.clamp(min, max),
        Some(n) if n < min as i64 => min,
        Some(n) if n > max as i64 => max,
        Some(n) => n as usize,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(width: &str, height: &str, mines: &str) -> ParamsRequest {
        let text = |s: &str| (!s.is_empty()).then(|| ParamInput::Text(s.to_string()));
        ParamsRequest {
            width: text(width),
            height: text(height),
            mines: text(mines),
            timed: false,
        }
    }

    #[test]
    fn empty_request_gives_defaults() {
        assert_eq!(ParamsRequest::default().resolve(), GameParams::default());
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let params = request("3", "99", "1").resolve();
        assert_eq!(params.width, MIN_DIMENSION);
        assert_eq!(params.height, MAX_DIMENSION);
        assert_eq!(params.mines, MIN_MINES);

        let params = request("5", "5", "1000").resolve();
        assert_eq!(params.mines, 24);
    }

    #[test]
    fn garbage_falls_back_to_defaults() {
        let params = request("abc", "", "zero").resolve();
        assert_eq!(params, GameParams::default());

        let params = request("0", "0", "0").resolve();
        assert_eq!(params, GameParams::default());
    }

    #[test]
    fn huge_numbers_clamp_to_the_bounds() {
        let params = request("99999999999999999999", "-99999999999999999999", "").resolve();
        assert_eq!(params.width, MAX_DIMENSION);
        assert_eq!(params.height, MIN_DIMENSION);

        let params = request("5", "5", "123456789012345678901234567890").resolve();
        assert_eq!(params.mines, 24);
    }

    #[test]
    fn custom_dimensions_scale_the_default_mine_count() {
        let params = request("20", "20", "").resolve();
        assert_eq!(params.mines, 92);

        let params = request("5", "5", "").resolve();
        assert_eq!(params.mines, 5);
    }

    #[test]
    fn text_is_read_like_a_form_field() {
        let params = request("12px", " 7", "-4").resolve();
        assert_eq!(params.width, 12);
        assert_eq!(params.height, 7);
        assert_eq!(params.mines, MIN_MINES);
    }

    #[test]
    fn json_numbers_and_strings_both_work() {
        let request: ParamsRequest =
            serde_json::from_str(r#"{"width": 8, "height": "9", "mines": 12.7, "timed": true}"#)
                .unwrap();
        let params = request.resolve();
        assert_eq!(
            params,
            GameParams {
                width: 8,
                height: 9,
                mines: 12,
                timed: true
            }
        );
    }

    #[test]
    fn clamped_params_stay_legal() {
        let params = GameParams {
            width: 1,
            height: 40,
            mines: 0,
            timed: false,
        }
        .clamped();
        assert_eq!((params.width, params.height, params.mines), (5, 20, 5));

        let params = GameParams {
            width: 5,
            height: 5,
            mines: 25,
            timed: false,
        }
        .clamped();
        assert_eq!(params.mines, 24);
    }
}
