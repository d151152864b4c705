//! Coordinate reference systems and re-projection to EPSG:4326.
//!
//! Every spatial join runs in geographic WGS84 coordinates. Layers in any
//! other system go through [`Crs::reproject`] first; the conversion is an
//! explicit step at load time, never implied by the join itself.
//!
//! Only the systems that actually show up in Brazilian municipal data are
//! supported: geographic SIRGAS 2000, the SIRGAS 2000 UTM south zones, and
//! Web Mercator exports from web mapping tools.

use geo::{Coord, MapCoords};

use crate::SpatialError;

/// EPSG code of geographic WGS84.
pub const WGS84_EPSG: u32 = 4326;

/// GRS80 semi-major axis (SIRGAS 2000), metres.
const GRS80_A: f64 = 6_378_137.0;
/// GRS80 flattening.
const GRS80_F: f64 = 1.0 / 298.257_222_101;
/// UTM scale factor on the central meridian.
const UTM_K0: f64 = 0.9996;
const UTM_FALSE_EASTING: f64 = 500_000.0;
const UTM_FALSE_NORTHING_SOUTH: f64 = 10_000_000.0;

/// EPSG:31978 is SIRGAS 2000 / UTM zone 18S; the series runs to 31985 (25S).
const SIRGAS_UTM_FIRST_EPSG: u32 = 31978;
const SIRGAS_UTM_FIRST_ZONE: u8 = 18;
const SIRGAS_UTM_LAST_ZONE: u8 = 25;

/// A supported coordinate reference system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Crs {
    /// EPSG:4326
    Wgs84,
    /// EPSG:4674. Differs from WGS84 by well under a metre, so coordinates
    /// pass through unchanged.
    Sirgas2000,
    /// EPSG:3857, spherical Web Mercator.
    WebMercator,
    /// EPSG:31978-31985, SIRGAS 2000 / UTM zone `zone` south.
    SirgasUtmSouth {
        /// UTM zone number (18-25).
        zone: u8,
    },
}

impl Crs {
    /// Resolves an EPSG code.
    ///
    /// # Errors
    ///
    /// Returns [`SpatialError::UnsupportedCrs`] for codes outside the
    /// supported set.
    pub fn from_epsg(code: u32) -> Result<Self, SpatialError> {
        match code {
            WGS84_EPSG => Ok(Self::Wgs84),
            4674 => Ok(Self::Sirgas2000),
            3857 | 900_913 => Ok(Self::WebMercator),
            c if (SIRGAS_UTM_FIRST_EPSG
                ..=SIRGAS_UTM_FIRST_EPSG + u32::from(SIRGAS_UTM_LAST_ZONE - SIRGAS_UTM_FIRST_ZONE))
                .contains(&c) =>
            {
                let offset = u8::try_from(c - SIRGAS_UTM_FIRST_EPSG)
                    .map_err(|_| SpatialError::UnsupportedCrs { code })?;
                Ok(Self::SirgasUtmSouth {
                    zone: SIRGAS_UTM_FIRST_ZONE + offset,
                })
            }
            _ => Err(SpatialError::UnsupportedCrs { code }),
        }
    }

    /// Resolves a CRS name as written in a `GeoJSON` `crs` member, e.g.
    /// `urn:ogc:def:crs:EPSG::31982`, `EPSG:4326`, or
    /// `urn:ogc:def:crs:OGC:1.3:CRS84`.
    ///
    /// # Errors
    ///
    /// Returns [`SpatialError::InvalidCrsName`] when no EPSG code can be
    /// read from the name, or [`SpatialError::UnsupportedCrs`] for an
    /// unsupported code.
    pub fn from_name(name: &str) -> Result<Self, SpatialError> {
        let trimmed = name.trim();
        if trimmed.to_ascii_uppercase().ends_with("CRS84") {
            return Ok(Self::Wgs84);
        }

        let code = trimmed
            .rsplit(':')
            .next()
            .and_then(|tail| tail.trim().parse::<u32>().ok())
            .ok_or_else(|| SpatialError::InvalidCrsName {
                name: trimmed.to_string(),
            })?;

        Self::from_epsg(code)
    }

    /// EPSG code of this system.
    #[must_use]
    pub fn epsg(self) -> u32 {
        match self {
            Self::Wgs84 => WGS84_EPSG,
            Self::Sirgas2000 => 4674,
            Self::WebMercator => 3857,
            Self::SirgasUtmSouth { zone } => {
                SIRGAS_UTM_FIRST_EPSG + u32::from(zone.saturating_sub(SIRGAS_UTM_FIRST_ZONE))
            }
        }
    }

    /// Whether coordinates are already longitude/latitude degrees.
    #[must_use]
    pub const fn is_geographic(self) -> bool {
        matches!(self, Self::Wgs84 | Self::Sirgas2000)
    }

    /// Converts one coordinate to WGS84 longitude/latitude.
    #[must_use]
    pub fn to_wgs84(self, coord: Coord<f64>) -> Coord<f64> {
        match self {
            Self::Wgs84 | Self::Sirgas2000 => coord,
            Self::WebMercator => web_mercator_to_wgs84(coord),
            Self::SirgasUtmSouth { zone } => utm_south_to_wgs84(coord, zone),
        }
    }

    /// Re-projects any geometry into WGS84.
    #[must_use]
    pub fn reproject<G>(self, geometry: &G) -> G
    where
        G: MapCoords<f64, f64, Output = G>,
    {
        geometry.map_coords(move |c| self.to_wgs84(c))
    }
}

impl std::fmt::Display for Crs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EPSG:{}", self.epsg())
    }
}

fn web_mercator_to_wgs84(coord: Coord<f64>) -> Coord<f64> {
    let lon = (coord.x / GRS80_A).to_degrees();
    let lat = 2.0f64
        .mul_add((coord.y / GRS80_A).exp().atan(), -std::f64::consts::FRAC_PI_2)
        .to_degrees();
    Coord { x: lon, y: lat }
}

/// Inverse transverse Mercator (Snyder, USGS PP 1395, eqs. 8-12 to 8-25)
/// on the GRS80 ellipsoid, southern hemisphere.
#[allow(clippy::many_single_char_names, clippy::suboptimal_flops)]
fn utm_south_to_wgs84(coord: Coord<f64>, zone: u8) -> Coord<f64> {
    let e2 = GRS80_F * (2.0 - GRS80_F);
    let e4 = e2 * e2;
    let e6 = e4 * e2;
    let ep2 = e2 / (1.0 - e2);

    let x = coord.x - UTM_FALSE_EASTING;
    let y = coord.y - UTM_FALSE_NORTHING_SOUTH;

    let m = y / UTM_K0;
    let mu = m / (GRS80_A * (1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0));

    let sqrt_1_e2 = (1.0 - e2).sqrt();
    let e1 = (1.0 - sqrt_1_e2) / (1.0 + sqrt_1_e2);
    let e1_2 = e1 * e1;
    let e1_3 = e1_2 * e1;
    let e1_4 = e1_3 * e1;

    let phi1 = mu
        + (3.0 * e1 / 2.0 - 27.0 * e1_3 / 32.0) * (2.0 * mu).sin()
        + (21.0 * e1_2 / 16.0 - 55.0 * e1_4 / 32.0) * (4.0 * mu).sin()
        + (151.0 * e1_3 / 96.0) * (6.0 * mu).sin()
        + (1097.0 * e1_4 / 512.0) * (8.0 * mu).sin();

    let sin_phi1 = phi1.sin();
    let cos_phi1 = phi1.cos();
    let tan_phi1 = phi1.tan();

    let n1 = GRS80_A / (1.0 - e2 * sin_phi1 * sin_phi1).sqrt();
    let t1 = tan_phi1 * tan_phi1;
    let c1 = ep2 * cos_phi1 * cos_phi1;
    let r1 = GRS80_A * (1.0 - e2) / (1.0 - e2 * sin_phi1 * sin_phi1).powf(1.5);
    let d = x / (n1 * UTM_K0);
    let d2 = d * d;
    let d3 = d2 * d;
    let d4 = d3 * d;
    let d5 = d4 * d;
    let d6 = d5 * d;

    let lat = phi1
        - (n1 * tan_phi1 / r1)
            * (d2 / 2.0 - (5.0 + 3.0 * t1 + 10.0 * c1 - 4.0 * c1 * c1 - 9.0 * ep2) * d4 / 24.0
                + (61.0 + 90.0 * t1 + 298.0 * c1 + 45.0 * t1 * t1 - 252.0 * ep2 - 3.0 * c1 * c1)
                    * d6
                    / 720.0);

    let lon0 = f64::from(zone).mul_add(6.0, -183.0).to_radians();
    let lon = lon0
        + (d - (1.0 + 2.0 * t1 + c1) * d3 / 6.0
            + (5.0 - 2.0 * c1 + 28.0 * t1 - 3.0 * c1 * c1 + 8.0 * ep2 + 24.0 * t1 * t1) * d5
                / 120.0)
            / cos_phi1;

    Coord {
        x: lon.to_degrees(),
        y: lat.to_degrees(),
    }
}
