/// Route loader: the built-in cooperative route plus `.route` files.
///
/// ## Route file format (`.route`):
///   ```
///   # Route Name
///   @ left=-5
///   <map rows, top row first; last row is y = 0>
///   ```
///
/// `@ left=` gives the wall x of column 0 (default: `-(width / 2)`).
///
/// ## Tile legend:
///   'r' = Red hold               'b' = Blue hold
///   '1' = Red hold + Player 1 spawn
///   '2' = Blue hold + Player 2 spawn
///   anything else = empty wall

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

use crate::config::GameConfig;
use crate::domain::geom::Vec3;
use crate::domain::hold::HoldColor;
use super::wall::{Wall, WallError, DEFAULT_HEIGHT, DEFAULT_WIDTH};

#[derive(Debug, Error)]
pub enum RouteError {
    #[error("could not read route {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },
    #[error("route line {line}: {msg}")]
    Parse { line: usize, msg: String },
    #[error("route has no spawn for player {0}")]
    MissingSpawn(u8),
    #[error(transparent)]
    Wall(#[from] WallError),
}

/// Parsed route data (owned; built-in or loaded from file).
#[derive(Clone, Debug)]
pub struct RouteDef {
    pub name: String,
    pub width: i32,
    pub height: i32,
    pub holds: Vec<(i32, i32, HoldColor)>,
    /// Player 1 spawn, Player 2 spawn.
    pub spawns: [Vec3; 2],
}

impl RouteDef {
    /// Build the wall. Two holds on one cell is a route error, not an overwrite.
    pub fn build_wall(&self) -> Result<Wall, WallError> {
        let mut wall = Wall::new(self.width, self.height);
        for &(x, y, color) in &self.holds {
            wall.try_add_hold(x as f32, y as f32, color)?;
        }
        Ok(wall)
    }
}

// ══════════════════════════════════════════════════════════════
// Built-in route
// ══════════════════════════════════════════════════════════════

/// Alternating red/blue holds with gaps that need a partner's body to cross.
pub fn builtin() -> RouteDef {
    use HoldColor::{Blue, Red};
    let holds = vec![
        // Start holds
        (-2, 2, Red), (2, 2, Blue),
        // First moves
        (-2, 3, Red), (-2, 4, Red), (2, 3, Blue), (2, 4, Blue),
        // Band 1
        (-3, 6, Blue), (3, 6, Red),
        // Band 2
        (-1, 10, Red), (1, 10, Blue),
        // Band 3
        (-4, 14, Blue), (4, 14, Red),
        // Band 4
        (-2, 18, Red), (2, 18, Blue),
        // Band 5
        (0, 22, Red), (-1, 24, Blue), (1, 24, Red),
        // Summit
        (-1, 28, Red), (1, 28, Blue),
    ];
    RouteDef {
        name: "Tandem Wall".into(),
        width: DEFAULT_WIDTH,
        height: DEFAULT_HEIGHT,
        holds,
        spawns: [Vec3::new(-2.0, 2.0, 0.0), Vec3::new(2.0, 2.0, 0.0)],
    }
}

// ══════════════════════════════════════════════════════════════
// File routes
// ══════════════════════════════════════════════════════════════

pub fn parse_route(text: &str) -> Result<RouteDef, RouteError> {
    let mut name = String::from("Untitled");
    let mut left: Option<i32> = None;
    let mut rows: Vec<(usize, &str)> = Vec::new();

    for (i, line) in text.lines().enumerate() {
        let line_no = i + 1;
        if let Some(rest) = line.strip_prefix('#') {
            name = rest.trim().to_string();
        } else if let Some(rest) = line.strip_prefix('@') {
            for token in rest.split_whitespace() {
                match token.split_once('=') {
                    Some(("left", v)) => {
                        let parsed = v.parse::<i32>().map_err(|_| RouteError::Parse {
                            line: line_no,
                            msg: format!("bad left offset {v:?}"),
                        })?;
                        left = Some(parsed);
                    }
                    _ => {
                        return Err(RouteError::Parse {
                            line: line_no,
                            msg: format!("unknown directive {token:?}"),
                        });
                    }
                }
            }
        } else if !line.trim().is_empty() || !rows.is_empty() {
            rows.push((line_no, line));
        }
    }

    // Trailing blank lines are not wall rows
    while rows.last().is_some_and(|(_, r)| r.trim().is_empty()) {
        rows.pop();
    }
    if rows.is_empty() {
        return Err(RouteError::Parse { line: 0, msg: "route has no rows".into() });
    }

    let height = rows.len() as i32;
    let width = rows.iter().map(|(_, r)| r.chars().count()).max().unwrap_or(0) as i32;
    let left = left.unwrap_or(-(width / 2));

    let mut holds = Vec::new();
    let mut spawns: [Option<Vec3>; 2] = [None, None];
    for (row_idx, (_, row)) in rows.iter().enumerate() {
        let y = height - 1 - row_idx as i32;
        for (col, ch) in row.chars().enumerate() {
            let x = left + col as i32;
            let color = match ch {
                'r' | 'R' | '1' => HoldColor::Red,
                'b' | 'B' | '2' => HoldColor::Blue,
                _ => continue,
            };
            holds.push((x, y, color));
            match ch {
                '1' => spawns[0] = Some(Vec3::new(x as f32, y as f32, 0.0)),
                '2' => spawns[1] = Some(Vec3::new(x as f32, y as f32, 0.0)),
                _ => {}
            }
        }
    }

    let [Some(p1), Some(p2)] = spawns else {
        let missing = if spawns[0].is_none() { 1 } else { 2 };
        return Err(RouteError::MissingSpawn(missing));
    };

    Ok(RouteDef { name, width, height, holds, spawns: [p1, p2] })
}

pub fn load_route(path: &Path) -> Result<RouteDef, RouteError> {
    let text = std::fs::read_to_string(path)
        .map_err(|source| RouteError::Io { path: path.to_path_buf(), source })?;
    parse_route(&text)
}

/// The configured route, or the built-in one when none is set or it fails to load.
pub fn resolve(config: &GameConfig) -> RouteDef {
    let Some(name) = &config.route else {
        return builtin();
    };
    let mut path = config.routes_dir.join(name);
    if path.extension().is_none() {
        path.set_extension("route");
    }
    match load_route(&path).and_then(|r| r.build_wall().map(|_| r).map_err(RouteError::from)) {
        Ok(route) => {
            info!(route = %route.name, holds = route.holds.len(), "loaded route");
            route
        }
        Err(e) => {
            warn!("{e}; falling back to built-in route");
            builtin()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_route_has_unique_cells() {
        let route = builtin();
        let wall = route.build_wall().unwrap();
        assert_eq!(wall.len(), route.holds.len());
        assert_eq!(wall.hold_at(-2.0, 2.0).map(|h| h.color), Some(HoldColor::Red));
        assert_eq!(wall.hold_at(2.0, 2.0).map(|h| h.color), Some(HoldColor::Blue));
        assert_eq!(wall.summit_row(), Some(28));
    }

    #[test]
    fn parses_grid_bottom_row_is_base() {
        let text = "# Tiny\n@ left=-2\n..r..\n.....\n1...2\n";
        let route = parse_route(text).unwrap();
        assert_eq!(route.name, "Tiny");
        assert_eq!(route.height, 3);
        assert_eq!(route.width, 5);
        assert_eq!(route.spawns[0], Vec3::new(-2.0, 0.0, 0.0));
        assert_eq!(route.spawns[1], Vec3::new(2.0, 0.0, 0.0));
        assert!(route.holds.contains(&(0, 2, HoldColor::Red)));
        assert!(route.holds.contains(&(2, 0, HoldColor::Blue)));
    }

    #[test]
    fn default_left_centers_the_grid() {
        let route = parse_route("1...2\n").unwrap();
        assert_eq!(route.spawns[0].x, -2.0);
        assert_eq!(route.spawns[1].x, 2.0);
    }

    #[test]
    fn missing_spawn_is_an_error() {
        assert!(matches!(parse_route("r...2\n"), Err(RouteError::MissingSpawn(1))));
    }

    #[test]
    fn unknown_directive_is_an_error() {
        assert!(matches!(parse_route("@ top=3\n1.2\n"), Err(RouteError::Parse { line: 1, .. })));
    }
}
