use glam::DVec2;

/// A ring of (lon, lat) degree coordinates, stored as supplied.
pub type Ring = Vec<DVec2>;

/// Feature geometry as read from the feature source.
#[derive(Clone, Debug, PartialEq)]
pub enum FeatureGeometry {
    /// First ring is the exterior, the rest are independent loops
    Polygon(Vec<Ring>),
    MultiPolygon(Vec<Vec<Ring>>),
}

impl FeatureGeometry {
    /// Iterate every ring of every polygon in order.
    pub fn rings(&self) -> Box<dyn Iterator<Item = &Ring> + '_> {
        match self {
            FeatureGeometry::Polygon(rings) => Box::new(rings.iter()),
            FeatureGeometry::MultiPolygon(polygons) => Box::new(polygons.iter().flatten()),
        }
    }

    pub fn bounding_box(&self) -> BoundingBox {
        let mut bbox = BoundingBox::EMPTY;
        for ring in self.rings() {
            for &point in ring {
                bbox.expand(point);
            }
        }
        bbox
    }

    /// True if the point lies inside any ring.
    ///
    /// Rings are ORed together for both variants, so a point inside an
    /// interior ring counts as inside the feature.
    pub fn contains(&self, point: DVec2) -> bool {
        self.rings().any(|ring| point_in_ring(point, ring))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            FeatureGeometry::Polygon(_) => "Polygon",
            FeatureGeometry::MultiPolygon(_) => "MultiPolygon",
        }
    }
}

/// A vector feature (country, landmass) with its identifier.
#[derive(Clone, Debug, PartialEq)]
pub struct Feature {
    pub id: String,
    pub geometry: FeatureGeometry,
}

impl Feature {
    pub fn new(id: impl Into<String>, geometry: FeatureGeometry) -> Self {
        Self {
            id: id.into(),
            geometry,
        }
    }

    pub fn polygon(id: impl Into<String>, rings: Vec<Ring>) -> Self {
        Self::new(id, FeatureGeometry::Polygon(rings))
    }

    pub fn multi_polygon(id: impl Into<String>, polygons: Vec<Vec<Ring>>) -> Self {
        Self::new(id, FeatureGeometry::MultiPolygon(polygons))
    }
}

/// Inclusive lon/lat bounding box
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    pub min: DVec2,
    pub max: DVec2,
}

impl BoundingBox {
    /// Contains nothing; expanding it by a point yields that point.
    pub const EMPTY: Self = Self {
        min: DVec2::splat(f64::INFINITY),
        max: DVec2::splat(f64::NEG_INFINITY),
    };

    #[inline(always)]
    pub fn expand(&mut self, point: DVec2) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    #[inline(always)]
    pub fn contains(&self, point: DVec2) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }

    pub fn is_empty(&self) -> bool {
        !(self.min.x <= self.max.x && self.min.y <= self.max.y)
    }
}

/// Signed area test: > 0 when `p` is left of the directed edge p0 -> p1.
#[inline(always)]
fn is_left(p0: DVec2, p1: DVec2, p: DVec2) -> f64 {
    (p1.x - p0.x) * (p.y - p0.y) - (p.x - p0.x) * (p1.y - p0.y)
}

/// Non-zero winding number test.
///
/// Only consecutive pairs are visited; a ring that is not explicitly closed
/// (first point repeated last) is missing its closing edge.
pub fn point_in_ring(point: DVec2, ring: &[DVec2]) -> bool {
    let mut winding = 0i32;
    for edge in ring.windows(2) {
        let (p0, p1) = (edge[0], edge[1]);
        if p0.y <= point.y {
            // upward crossing
            if p1.y > point.y && is_left(p0, p1, point) > 0.0 {
                winding += 1;
            }
        } else if p1.y <= point.y && is_left(p0, p1, point) < 0.0 {
            // downward crossing
            winding -= 1;
        }
    }
    winding != 0
}
