//! OSRM HTTP adapter for the distance oracle.

use serde::Deserialize;

use crate::error::OracleError;
use crate::traits::{Coordinate, DistanceOracle, Leg};

#[derive(Debug, Clone)]
pub struct OsrmConfig {
    pub base_url: String,
    pub profile: String,
    pub timeout_secs: u64,
}

impl Default for OsrmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            profile: "car".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OsrmClient {
    config: OsrmConfig,
    client: reqwest::blocking::Client,
}

impl OsrmClient {
    pub fn new(config: OsrmConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    fn url(&self, service: &str, points: &[Coordinate], query: &str) -> String {
        let coords = points
            .iter()
            .map(|point| format!("{:.6},{:.6}", point.lng, point.lat))
            .collect::<Vec<_>>()
            .join(";");
        format!(
            "{}/{}/v1/{}/{}?{}",
            self.config.base_url, service, self.config.profile, coords, query
        )
    }

    /// Decodes the body even on HTTP errors, since OSRM explains 4xx
    /// failures in the JSON `code`/`message` fields.
    fn fetch<T>(&self, url: String) -> Result<T, OracleError>
    where
        T: for<'de> Deserialize<'de> + OsrmStatus,
    {
        let response = self.client.get(url).send()?;
        let status = response.status();
        match response.json::<T>() {
            Ok(body) => check_code(body),
            Err(_) if !status.is_success() => Err(OracleError::Status {
                code: status.as_u16().to_string(),
                message: status.canonical_reason().unwrap_or_default().to_string(),
            }),
            Err(err) => Err(err.into()),
        }
    }
}

impl DistanceOracle for OsrmClient {
    fn get_distance(&self, from: Coordinate, to: Coordinate) -> Result<Leg, OracleError> {
        if from.same_point(&to) {
            return Ok(Leg::ZERO);
        }

        let url = self.url("route", &[from, to], "overview=false");
        let body: OsrmRouteResponse = self.fetch(url)?;
        body.routes
            .first()
            .map(|route| Leg::new(route.distance, route.duration))
            .ok_or(OracleError::MissingValue { from: 0, to: 1 })
    }

    fn get_distance_matrix(&self, points: &[Coordinate]) -> Result<Vec<Vec<Leg>>, OracleError> {
        if points.is_empty() {
            return Ok(Vec::new());
        }

        let url = self.url("table", points, "annotations=duration,distance");
        table_legs(self.fetch(url)?, points.len())
    }
}

fn check_code<T: OsrmStatus>(body: T) -> Result<T, OracleError> {
    if body.code() != "Ok" {
        return Err(OracleError::Status {
            code: body.code().to_string(),
            message: body.message().unwrap_or_default().to_string(),
        });
    }
    Ok(body)
}

/// Converts a `/table` answer into an `n x n` grid with a zero diagonal.
fn table_legs(body: OsrmTableResponse, n: usize) -> Result<Vec<Vec<Leg>>, OracleError> {
    let durations = body.durations.unwrap_or_default();
    let distances = body.distances.unwrap_or_default();
    if durations.len() != n || distances.len() != n {
        return Err(OracleError::MalformedMatrix {
            expected: n,
            rows: durations.len().min(distances.len()),
        });
    }

    durations
        .into_iter()
        .zip(distances)
        .enumerate()
        .map(|(from, (duration_row, distance_row))| {
            if duration_row.len() != n || distance_row.len() != n {
                return Err(OracleError::MalformedMatrix {
                    expected: n,
                    rows: duration_row.len().min(distance_row.len()),
                });
            }
            duration_row
                .into_iter()
                .zip(distance_row)
                .enumerate()
                .map(|(to, cell)| match cell {
                    _ if from == to => Ok(Leg::ZERO),
                    (Some(duration), Some(distance)) => Ok(Leg::new(distance, duration)),
                    _ => Err(OracleError::MissingValue { from, to }),
                })
                .collect::<Result<Vec<_>, _>>()
        })
        .collect()
}

trait OsrmStatus {
    fn code(&self) -> &str;
    fn message(&self) -> Option<&str>;
}

#[derive(Debug, Deserialize)]
struct OsrmRouteResponse {
    code: String,
    message: Option<String>,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    distance: f64,
    duration: f64,
}

#[derive(Debug, Deserialize)]
struct OsrmTableResponse {
    code: String,
    message: Option<String>,
    durations: Option<Vec<Vec<Option<f64>>>>,
    distances: Option<Vec<Vec<Option<f64>>>>,
}

impl OsrmStatus for OsrmRouteResponse {
    fn code(&self) -> &str {
        &self.code
    }

    fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

impl OsrmStatus for OsrmTableResponse {
    fn code(&self) -> &str {
        &self.code
    }

    fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}
