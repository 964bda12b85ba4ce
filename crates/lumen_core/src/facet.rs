//! Polygon meshes built from flat convex facets.
//!
//! A [`FacetStructure`] is a tree of groups, each holding facets and child
//! groups. The tree is stored flat: group 0 is the root and every child sits
//! at a higher index than its parent, so bounds can be recomputed with a
//! single reverse scan.

use std::collections::HashMap;
use std::sync::Arc;

use lumen_math::{Bounds, Similarity, Vec3};

use crate::error::{SceneError, SceneResult};
use crate::material::Material;
use crate::primitive::BOUNDS_PADDING;

/// Vertices further than this (relative to the facet size) from the facet
/// plane make it non-planar.
const PLANARITY_TOLERANCE: f32 = 1e-3;

/// A flat convex polygon.
#[derive(Debug, Clone)]
pub struct Facet {
    vertices: Vec<Vec3>,
    normal: Vec3,
    vertex_normals: Option<Vec<Vec3>>,
    material: Arc<Material>,
}

impl Facet {
    /// Create a facet from its vertices in counter-clockwise order (seen from
    /// the side the face normal points to).
    pub fn new(vertices: Vec<Vec3>, material: Arc<Material>) -> SceneResult<Self> {
        if vertices.len() < 3 {
            return Err(SceneError::DegenerateFacet(format!(
                "{} vertices, need at least 3",
                vertices.len()
            )));
        }
        if vertices.iter().any(|v| !v.is_finite()) {
            return Err(SceneError::DegenerateFacet("non-finite vertex".into()));
        }

        let normal = newell_normal(&vertices)
            .try_normalize()
            .ok_or_else(|| SceneError::DegenerateFacet("zero area".into()))?;

        let extent = Bounds::enclosing(&vertices);
        let tolerance = PLANARITY_TOLERANCE * (extent.max() - extent.min()).max_element();
        let v0 = vertices[0];
        if vertices
            .iter()
            .any(|v| (*v - v0).dot(normal).abs() > tolerance)
        {
            return Err(SceneError::DegenerateFacet("vertices are not coplanar".into()));
        }

        Ok(Self {
            vertices,
            normal,
            vertex_normals: None,
            material,
        })
    }

    /// Attach per-vertex normals for smooth shading.
    pub fn with_vertex_normals(mut self, normals: Vec<Vec3>) -> SceneResult<Self> {
        if normals.len() != self.vertices.len() {
            return Err(SceneError::DegenerateFacet(format!(
                "{} vertex normals for {} vertices",
                normals.len(),
                self.vertices.len()
            )));
        }
        let normals = normals
            .into_iter()
            .map(|n| n.try_normalize())
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| SceneError::DegenerateFacet("zero-length vertex normal".into()))?;
        self.vertex_normals = Some(normals);
        Ok(self)
    }

    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    /// Unit face normal.
    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    pub fn vertex_normals(&self) -> Option<&[Vec3]> {
        self.vertex_normals.as_deref()
    }

    pub fn material(&self) -> &Arc<Material> {
        &self.material
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::enclosing(&self.vertices).pad(BOUNDS_PADDING)
    }

    pub fn transform(&mut self, transform: &Similarity) {
        for v in &mut self.vertices {
            *v = transform.transform_point(*v);
        }
        self.normal = transform.transform_normal(self.normal);
        if let Some(normals) = &mut self.vertex_normals {
            for n in normals {
                *n = transform.transform_normal(*n);
            }
        }
    }
}

/// Polygon normal by Newell's method, scaled by twice the polygon area.
fn newell_normal(vertices: &[Vec3]) -> Vec3 {
    let mut n = Vec3::ZERO;
    for (i, a) in vertices.iter().enumerate() {
        let b = vertices[(i + 1) % vertices.len()];
        n.x += (a.y - b.y) * (a.z + b.z);
        n.y += (a.z - b.z) * (a.x + b.x);
        n.z += (a.x - b.x) * (a.y + b.y);
    }
    n
}

/// One level of a facet structure.
#[derive(Debug, Clone)]
pub struct FacetGroup {
    facets: Vec<Facet>,
    children: Vec<usize>,
    parent: Option<usize>,
    bounds: Bounds,
}

impl FacetGroup {
    fn new(parent: Option<usize>) -> Self {
        Self {
            facets: Vec::new(),
            children: Vec::new(),
            parent,
            bounds: Bounds::EMPTY,
        }
    }

    pub fn facets(&self) -> &[Facet] {
        &self.facets
    }

    /// Arena indices of the child groups.
    pub fn children(&self) -> &[usize] {
        &self.children
    }

    /// Union of this group's facets and all of its descendants.
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }
}

/// Hierarchical facet mesh.
#[derive(Debug, Clone)]
pub struct FacetStructure {
    groups: Vec<FacetGroup>,
}

impl FacetStructure {
    pub fn new() -> Self {
        Self {
            groups: vec![FacetGroup::new(None)],
        }
    }

    /// Build a single-level structure from shared vertices and polygon
    /// index lists.
    pub fn from_polygons(
        vertices: &[Vec3],
        polygons: &[Vec<usize>],
        material: Arc<Material>,
    ) -> SceneResult<Self> {
        let mut structure = Self::new();
        for polygon in polygons {
            let points = polygon
                .iter()
                .map(|&i| vertices.get(i).copied())
                .collect::<Option<Vec<_>>>()
                .ok_or_else(|| SceneError::DegenerateFacet("vertex index out of range".into()))?;
            structure.add_facet(Facet::new(points, material.clone())?);
        }
        Ok(structure)
    }

    pub fn add_facet(&mut self, facet: Facet) {
        let bounds = facet.bounds();
        self.groups[0].facets.push(facet);
        self.grow(0, &bounds);
    }

    /// Nest `child` as a sub-structure of the root.
    pub fn add_structure(&mut self, child: FacetStructure) {
        let offset = self.groups.len();
        let bounds = child.bounds();
        for mut group in child.groups {
            group.parent = Some(group.parent.map_or(0, |p| p + offset));
            for c in &mut group.children {
                *c += offset;
            }
            self.groups.push(group);
        }
        self.groups[0].children.push(offset);
        self.grow(0, &bounds);
    }

    /// Extend the bounds of `group` and its ancestors.
    fn grow(&mut self, group: usize, bounds: &Bounds) {
        let mut current = Some(group);
        while let Some(i) = current {
            self.groups[i].bounds = self.groups[i].bounds.union(bounds);
            current = self.groups[i].parent;
        }
    }

    /// Recompute every group's bounds. Children always follow their parent
    /// in the arena, so a reverse scan sees them first.
    pub fn update_bounds(&mut self) {
        for i in (0..self.groups.len()).rev() {
            let own = self.groups[i]
                .facets
                .iter()
                .fold(Bounds::EMPTY, |acc, f| acc.union(&f.bounds()));
            let bounds = self.groups[i]
                .children
                .iter()
                .fold(own, |acc, &c| acc.union(&self.groups[c].bounds));
            self.groups[i].bounds = bounds;
        }
    }

    pub fn bounds(&self) -> Bounds {
        self.groups[0].bounds
    }

    pub fn groups(&self) -> &[FacetGroup] {
        &self.groups
    }

    pub fn facets(&self) -> impl Iterator<Item = &Facet> {
        self.groups.iter().flat_map(|g| g.facets.iter())
    }

    pub fn facet_count(&self) -> usize {
        self.groups.iter().map(|g| g.facets.len()).sum()
    }

    pub fn transform(&mut self, transform: &Similarity) {
        for group in &mut self.groups {
            for facet in &mut group.facets {
                facet.transform(transform);
            }
        }
        self.update_bounds();
    }

    /// Give every facet per-vertex normals averaged over all facets sharing
    /// that vertex position.
    pub fn compute_smooth_normals(&mut self) {
        let key = |v: &Vec3| [v.x.to_bits(), v.y.to_bits(), v.z.to_bits()];

        let mut sums: HashMap<[u32; 3], Vec3> = HashMap::new();
        for facet in self.facets() {
            for v in &facet.vertices {
                *sums.entry(key(v)).or_insert(Vec3::ZERO) += facet.normal;
            }
        }

        for group in &mut self.groups {
            for facet in &mut group.facets {
                let normals = facet
                    .vertices
                    .iter()
                    .map(|v| {
                        sums.get(&key(v))
                            .and_then(|n| n.try_normalize())
                            .unwrap_or(facet.normal)
                    })
                    .collect();
                facet.vertex_normals = Some(normals);
            }
        }
    }

    /// Every distinct material used by the structure.
    pub fn materials(&self) -> Vec<&Arc<Material>> {
        let mut out: Vec<&Arc<Material>> = Vec::new();
        for facet in self.facets() {
            if !out.iter().any(|m| Arc::ptr_eq(m, &facet.material)) {
                out.push(&facet.material);
            }
        }
        out
    }
}

impl Default for FacetStructure {
    fn default() -> Self {
        Self::new()
    }
}
