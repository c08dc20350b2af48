//! The working projected coordinate system.
//!
//! Containment math runs in a planar metric. The working projection is a
//! Lambert conformal conic with two standard parallels on an ellipsoid,
//! which is what US state plane zones such as Montana's (EPSG:32100) use.
//! The transform itself is delegated to `proj4rs`.

use geo::{Coord, MapCoords, MultiPolygon, Point};
use proj4rs::proj::Proj;
use proj4rs::transform::transform;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while building or applying a projection.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProjectionError {
    /// `proj4rs` rejected a projection definition.
    #[error("Invalid projection definition '{definition}': {message}")]
    Definition {
        /// The proj string that failed to parse.
        definition: String,
        /// Error reported by `proj4rs`.
        message: String,
    },

    /// A coordinate could not be transformed.
    #[error("Cannot project ({lon}, {lat}) to EPSG:{epsg}: {message}")]
    Transform {
        /// Target EPSG code.
        epsg: u32,
        /// Longitude of the input, in degrees.
        lon: f64,
        /// Latitude of the input, in degrees.
        lat: f64,
        /// Error reported by `proj4rs`.
        message: String,
    },
}

/// Parameters of a two-standard-parallel Lambert conformal conic projection.
///
/// Angles are in degrees; distances in meters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionParams {
    /// EPSG code of the projected CRS.
    pub epsg: u32,
    /// Ellipsoid semi-major axis.
    pub semi_major_axis: f64,
    /// Ellipsoid inverse flattening.
    pub inverse_flattening: f64,
    /// First standard parallel.
    pub standard_parallel_1: f64,
    /// Second standard parallel.
    pub standard_parallel_2: f64,
    /// Latitude of the false origin.
    pub latitude_of_origin: f64,
    /// Longitude of the false origin.
    pub central_meridian: f64,
    /// Easting at the false origin.
    pub false_easting: f64,
    /// Northing at the false origin.
    pub false_northing: f64,
}

impl ProjectionParams {
    /// NAD83 / Montana state plane (EPSG:32100).
    #[must_use]
    pub const fn montana_state_plane() -> Self {
        Self {
            epsg: 32100,
            semi_major_axis: 6_378_137.0,
            inverse_flattening: 298.257_222_101,
            standard_parallel_1: 49.0,
            standard_parallel_2: 45.0,
            latitude_of_origin: 44.25,
            central_meridian: -109.5,
            false_easting: 600_000.0,
            false_northing: 0.0,
        }
    }

    /// Proj string of the geographic system on the same ellipsoid.
    fn geographic_definition(&self) -> String {
        format!(
            "+proj=longlat +a={} +rf={} +no_defs",
            self.semi_major_axis, self.inverse_flattening
        )
    }

    /// Proj string of the projected system.
    fn projected_definition(&self) -> String {
        format!(
            "+proj=lcc +lat_1={} +lat_2={} +lat_0={} +lon_0={} +x_0={} +y_0={} +a={} +rf={} \
             +units=m +no_defs",
            self.standard_parallel_1,
            self.standard_parallel_2,
            self.latitude_of_origin,
            self.central_meridian,
            self.false_easting,
            self.false_northing,
            self.semi_major_axis,
            self.inverse_flattening
        )
    }
}

fn parse_proj(definition: String) -> Result<Proj, ProjectionError> {
    Proj::from_proj_string(&definition).map_err(|e| ProjectionError::Definition {
        message: format!("{e:?}"),
        definition,
    })
}

/// A ready-to-use Lambert conformal conic projection.
pub struct LambertConformalConic {
    epsg: u32,
    geographic: Proj,
    projected: Proj,
}

impl std::fmt::Debug for LambertConformalConic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LambertConformalConic")
            .field("epsg", &self.epsg)
            .finish_non_exhaustive()
    }
}

impl LambertConformalConic {
    /// Builds the source and target `proj4rs` systems from `params`.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectionError::Definition`] if `proj4rs` rejects the
    /// parameters.
    pub fn new(params: &ProjectionParams) -> Result<Self, ProjectionError> {
        let geographic = parse_proj(params.geographic_definition())?;
        let projected = parse_proj(params.projected_definition())?;

        Ok(Self {
            epsg: params.epsg,
            geographic,
            projected,
        })
    }

    /// NAD83 / Montana state plane (EPSG:32100).
    ///
    /// # Errors
    ///
    /// See [`LambertConformalConic::new`].
    pub fn montana_state_plane() -> Result<Self, ProjectionError> {
        Self::new(&ProjectionParams::montana_state_plane())
    }

    /// EPSG code of the projected CRS.
    #[must_use]
    pub const fn epsg(&self) -> u32 {
        self.epsg
    }

    /// Projects geographic `(lon, lat)` degrees to `(easting, northing)`.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectionError::Transform`] if `proj4rs` cannot project
    /// the coordinate.
    pub fn forward(&self, lon: f64, lat: f64) -> Result<(f64, f64), ProjectionError> {
        let mut point = (lon.to_radians(), lat.to_radians(), 0.0);
        transform(&self.geographic, &self.projected, &mut point).map_err(|e| {
            ProjectionError::Transform {
                epsg: self.epsg,
                lon,
                lat,
                message: format!("{e:?}"),
            }
        })?;

        Ok((point.0, point.1))
    }

    /// Projects a single coordinate.
    ///
    /// # Errors
    ///
    /// See [`LambertConformalConic::forward`].
    pub fn project_coord(&self, coord: Coord<f64>) -> Result<Coord<f64>, ProjectionError> {
        let (x, y) = self.forward(coord.x, coord.y)?;
        Ok(Coord { x, y })
    }

    /// Projects a point.
    ///
    /// # Errors
    ///
    /// See [`LambertConformalConic::forward`].
    pub fn project_point(&self, point: Point<f64>) -> Result<Point<f64>, ProjectionError> {
        self.project_coord(point.0).map(Point)
    }

    /// Projects every vertex of a multipolygon.
    ///
    /// # Errors
    ///
    /// Fails on the first vertex that cannot be projected.
    pub fn project_multi_polygon(
        &self,
        geometry: &MultiPolygon<f64>,
    ) -> Result<MultiPolygon<f64>, ProjectionError> {
        geometry.try_map_coords(|c| self.project_coord(c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn montana() -> LambertConformalConic {
        LambertConformalConic::montana_state_plane().unwrap()
    }

    #[test]
    fn origin_maps_to_false_easting_and_northing() {
        let (x, y) = montana().forward(-109.5, 44.25).unwrap();
        assert!((x - 600_000.0).abs() < 1e-3, "x = {x}");
        assert!(y.abs() < 1e-3, "y = {y}");
    }

    #[test]
    fn central_meridian_keeps_false_easting() {
        let (x, y) = montana().forward(-109.5, 47.0).unwrap();
        assert!((x - 600_000.0).abs() < 1e-3);
        // Roughly 2.75 degrees of latitude north of the origin.
        assert!((y - 305_700.0).abs() < 2_000.0, "y = {y}");
    }

    #[test]
    fn axes_increase_east_and_north() {
        let proj = montana();
        let (x_west, _) = proj.forward(-112.0, 46.0).unwrap();
        let (x_east, _) = proj.forward(-106.0, 46.0).unwrap();
        let (_, y_south) = proj.forward(-110.0, 45.0).unwrap();
        let (_, y_north) = proj.forward(-110.0, 48.5).unwrap();
        assert!(x_west < 600_000.0 && x_east > 600_000.0);
        assert!(y_north > y_south);
    }

    #[test]
    fn matches_published_state_plane_coordinates() {
        // Bozeman, MT in EPSG:32100.
        let (x, y) = montana().forward(-111.04, 45.68).unwrap();
        assert!((x - 480_069.2).abs() < 1.0, "x = {x}");
        assert!((y - 160_103.8).abs() < 1.0, "y = {y}");
    }

    #[test]
    fn projects_every_multipolygon_vertex() {
        let square = MultiPolygon(vec![geo::Polygon::new(
            geo::LineString::from(vec![
                (-110.0, 45.0),
                (-109.0, 45.0),
                (-109.0, 46.0),
                (-110.0, 45.0),
            ]),
            vec![],
        )]);
        let projected = montana().project_multi_polygon(&square).unwrap();
        let ring = &projected.0[0].exterior().0;
        assert_eq!(ring.len(), 4);
        assert!(ring.iter().all(|c| c.x > 500_000.0 && c.y > 50_000.0));
    }

    #[test]
    fn rejects_opposite_standard_parallels() {
        let params = ProjectionParams {
            standard_parallel_1: 45.0,
            standard_parallel_2: -45.0,
            ..ProjectionParams::montana_state_plane()
        };
        assert!(matches!(
            LambertConformalConic::new(&params),
            Err(ProjectionError::Definition { .. })
        ));
    }

    #[test]
    fn deserializes_params_from_toml() {
        let params: ProjectionParams = toml::from_str(
            r"
            epsg = 32100
            semi_major_axis = 6378137.0
            inverse_flattening = 298.257222101
            standard_parallel_1 = 49.0
            standard_parallel_2 = 45.0
            latitude_of_origin = 44.25
            central_meridian = -109.5
            false_easting = 600000.0
            false_northing = 0.0
            ",
        )
        .unwrap();
        assert_eq!(params, ProjectionParams::montana_state_plane());
    }
}
