//! Protocol vocabulary
//!
//! Every request name the lexer accepts at the head of a statement. The exact
//! set here is the authority; the pre-filters in [`filter`](super::filter) only
//! decide whether a word is worth looking up.

use once_cell::sync::Lazy;
use std::collections::HashSet;

/// RenderMan Interface requests, plus `version` and the session markers
pub const REQUESTS: &[&str] = &[
    "version",
    "Begin",
    "End",
    "Verbatim",
    "Declare",
    "FrameBegin",
    "FrameEnd",
    "WorldBegin",
    "WorldEnd",
    "Format",
    "FrameAspectRatio",
    "ScreenWindow",
    "CropWindow",
    "Projection",
    "Clipping",
    "ClippingPlane",
    "DepthOfField",
    "Shutter",
    "PixelVariance",
    "PixelSamples",
    "PixelFilter",
    "Exposure",
    "Imager",
    "Quantize",
    "Display",
    "DisplayChannel",
    "Hider",
    "ColorSamples",
    "RelativeDetail",
    "Option",
    "Camera",
    "AttributeBegin",
    "AttributeEnd",
    "Color",
    "Opacity",
    "TextureCoordinates",
    "LightSource",
    "AreaLightSource",
    "Illuminate",
    "Surface",
    "Displacement",
    "Atmosphere",
    "Interior",
    "Exterior",
    "Shader",
    "ShadingRate",
    "ShadingInterpolation",
    "Matte",
    "Bound",
    "Detail",
    "DetailRange",
    "GeometricApproximation",
    "Orientation",
    "ReverseOrientation",
    "Sides",
    "Identity",
    "Transform",
    "ConcatTransform",
    "Perspective",
    "Translate",
    "Rotate",
    "Scale",
    "Skew",
    "Deformation",
    "CoordinateSystem",
    "CoordSysTransform",
    "ScopedCoordinateSystem",
    "TransformBegin",
    "TransformEnd",
    "Attribute",
    "Polygon",
    "GeneralPolygon",
    "PointsPolygons",
    "PointsGeneralPolygons",
    "Basis",
    "Patch",
    "PatchMesh",
    "NuPatch",
    "TrimCurve",
    "SubdivisionMesh",
    "HierarchicalSubdivisionMesh",
    "Sphere",
    "Cone",
    "Cylinder",
    "Hyperboloid",
    "Paraboloid",
    "Disk",
    "Torus",
    "Points",
    "Curves",
    "Blobby",
    "Procedural",
    "Geometry",
    "SolidBegin",
    "SolidEnd",
    "ObjectBegin",
    "ObjectEnd",
    "ObjectInstance",
    "MotionBegin",
    "MotionEnd",
    "MakeTexture",
    "MakeBump",
    "MakeLatLongEnvironment",
    "MakeCubeFaceEnvironment",
    "MakeShadow",
    "MakeBrickMap",
    "ArchiveRecord",
    "ReadArchive",
    "ArchiveBegin",
    "ArchiveEnd",
    "Resource",
    "ResourceBegin",
    "ResourceEnd",
    "IfBegin",
    "ElseIf",
    "Else",
    "IfEnd",
    "ErrorHandler",
    "System",
];

static VOCABULARY: Lazy<HashSet<&'static str>> = Lazy::new(|| REQUESTS.iter().copied().collect());

/// Exact lookup, returning the canonical static name
pub fn lookup(word: &str) -> Option<&'static str> {
    VOCABULARY.get(word).copied()
}

pub fn contains(word: &str) -> bool {
    VOCABULARY.contains(word)
}
