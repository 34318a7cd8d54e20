//! Driving context
//!
//! [`Context`] owns a [`Pipeline`] and shapes typed arguments into requests. Each
//! call builds one [`Request`] and writes it; errors come back from whichever
//! stage rejected it.
//!
//! Handles (lights, objects, shaders) are names chosen by the caller. They travel
//! as tagged strings; a [`HandleFilter`](crate::rib::pipeline::HandleFilter) in
//! the pipeline turns them into numbers.

use crate::rib::error::{Result, RibError};
use crate::rib::pipeline::Pipeline;
use crate::rib::request::{
    Request, BEGIN, COMMENT, DEBUG_BARRIER, END, RIB_STRUCTURE, STRUCTURAL_HINT, VERBATIM,
};
use crate::rib::values::{reduce, HandleNamespace, Value};
use std::fmt;
use std::str::FromStr;

/// Protocol version written by [`Context::version`]
pub const PROTOCOL_VERSION: f64 = 3.04;

/// Kinds of archive record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    /// `# text`
    Comment,
    /// `## text`
    Structure,
    /// `Verbatim text`
    Verbatim,
}

impl RecordKind {
    /// Request name the record is written under
    pub fn marker(&self) -> &'static str {
        match self {
            RecordKind::Comment => COMMENT,
            RecordKind::Structure => STRUCTURAL_HINT,
            RecordKind::Verbatim => VERBATIM,
        }
    }
}

impl FromStr for RecordKind {
    type Err = RibError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "comment" => Ok(RecordKind::Comment),
            "structure" => Ok(RecordKind::Structure),
            "verbatim" => Ok(RecordKind::Verbatim),
            other => Err(RibError::BadArgument(format!(
                "unknown archive record kind '{}'",
                other
            ))),
        }
    }
}

macro_rules! bare_requests {
    ($($(#[$meta:meta])* $method:ident => $name:literal),* $(,)?) => {
        $(
            $(#[$meta])*
            pub fn $method(&mut self) -> Result<()> {
                self.write(Request::new($name))
            }
        )*
    };
}

/// Call surface over an owned pipeline
#[derive(Debug)]
pub struct Context {
    pipeline: Pipeline,
}

impl Context {
    pub fn new(pipeline: Pipeline) -> Self {
        Context { pipeline }
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn into_pipeline(self) -> Pipeline {
        self.pipeline
    }

    fn write(&mut self, request: Request) -> Result<()> {
        self.pipeline.write(request)
    }

    /// Any request, shaped by the caller
    pub fn request(
        &mut self,
        name: impl Into<String>,
        required: Vec<Value>,
        optional: Vec<Value>,
    ) -> Result<()> {
        self.pipeline.write((name, required, optional))
    }

    /// Start the named archive and write the file banner
    pub fn begin(&mut self, name: &str) -> Result<()> {
        self.write(Request::new(BEGIN).arg(Value::string(name)))?;
        self.write(Request::new(RIB_STRUCTURE))
    }

    pub fn end(&mut self) -> Result<()> {
        self.write(Request::new(END))
    }

    /// Fails if `version` does not share the supported major version
    pub fn version(&mut self, version: f64) -> Result<()> {
        if version.trunc() != PROTOCOL_VERSION.trunc() {
            return Err(RibError::BadVersion {
                requested: reduce(version),
                supported: reduce(PROTOCOL_VERSION),
            });
        }
        self.write(Request::new("version").arg(version))
    }

    pub fn comment(&mut self, text: &str) -> Result<()> {
        self.archive_record(RecordKind::Comment, format_args!("{}", text))
    }

    /// Write a formatted record, e.g.
    /// `ctx.archive_record(RecordKind::Comment, format_args!("frame {}", n))`.
    /// Multi-line text becomes one record per line.
    pub fn archive_record(&mut self, kind: RecordKind, args: fmt::Arguments<'_>) -> Result<()> {
        let text = fmt::format(args);
        for line in text.trim_end_matches(['\r', '\n']).split('\n') {
            let line = line.strip_suffix('\r').unwrap_or(line);
            self.write(Request::new(kind.marker()).arg(Value::name(line)))?;
        }
        Ok(())
    }

    /// Timer checkpoint; never reaches the output
    pub fn debug_barrier(&mut self, label: &str) -> Result<()> {
        self.write(Request::new(DEBUG_BARRIER).arg(Value::name(label)))
    }

    pub fn display(
        &mut self,
        name: &str,
        kind: &str,
        mode: &str,
        params: Vec<Value>,
    ) -> Result<()> {
        self.write(
            Request::new("Display")
                .arg(Value::string(name))
                .arg(Value::token(kind))
                .arg(Value::token(mode))
                .params(params),
        )
    }

    pub fn format(&mut self, xres: i32, yres: i32, pixel_aspect: f64) -> Result<()> {
        self.write(Request::new("Format").arg(xres).arg(yres).arg(pixel_aspect))
    }

    pub fn projection(&mut self, name: &str, params: Vec<Value>) -> Result<()> {
        self.write(Request::new("Projection").arg(Value::token(name)).params(params))
    }

    pub fn translate(&mut self, dx: f64, dy: f64, dz: f64) -> Result<()> {
        self.write(Request::new("Translate").arg(dx).arg(dy).arg(dz))
    }

    pub fn rotate(&mut self, angle: f64, dx: f64, dy: f64, dz: f64) -> Result<()> {
        self.write(Request::new("Rotate").arg(angle).arg(dx).arg(dy).arg(dz))
    }

    pub fn scale(&mut self, sx: f64, sy: f64, sz: f64) -> Result<()> {
        self.write(Request::new("Scale").arg(sx).arg(sy).arg(sz))
    }

    pub fn color(&mut self, rgb: &[f64]) -> Result<()> {
        self.write(Request::new("Color").arg(Value::Color(rgb.to_vec())))
    }

    bare_requests! {
        world_begin => "WorldBegin",
        world_end => "WorldEnd",
        attribute_begin => "AttributeBegin",
        attribute_end => "AttributeEnd",
        transform_begin => "TransformBegin",
        transform_end => "TransformEnd",
        frame_end => "FrameEnd",
        solid_end => "SolidEnd",
        motion_end => "MotionEnd",
        object_end => "ObjectEnd",
    }

    pub fn frame_begin(&mut self, frame: i32) -> Result<()> {
        self.write(Request::new("FrameBegin").arg(frame))
    }

    /// `operation` is one of primitive, intersection, union, difference
    pub fn solid_begin(&mut self, operation: &str) -> Result<()> {
        self.write(Request::new("SolidBegin").arg(Value::token(operation)))
    }

    pub fn motion_begin(&mut self, times: &[f64]) -> Result<()> {
        self.write(Request::new("MotionBegin").arg(Value::FloatArray(times.to_vec())))
    }

    pub fn object_begin(&mut self, handle: &str) -> Result<()> {
        self.write(Request::new("ObjectBegin").arg(Value::handle(HandleNamespace::Object, handle)))
    }

    pub fn object_instance(&mut self, handle: &str) -> Result<()> {
        self.write(
            Request::new("ObjectInstance").arg(Value::handle(HandleNamespace::Object, handle)),
        )
    }

    pub fn light_source(&mut self, shader: &str, handle: &str, params: Vec<Value>) -> Result<()> {
        self.write(
            Request::new("LightSource")
                .arg(Value::string(shader))
                .arg(Value::handle(HandleNamespace::Light, handle))
                .params(params),
        )
    }

    pub fn illuminate(&mut self, handle: &str, on: bool) -> Result<()> {
        self.write(
            Request::new("Illuminate")
                .arg(Value::handle(HandleNamespace::Light, handle))
                .arg(on),
        )
    }

    pub fn surface(&mut self, shader: &str, params: Vec<Value>) -> Result<()> {
        self.write(Request::new("Surface").arg(Value::string(shader)).params(params))
    }

    pub fn sphere(
        &mut self,
        radius: f64,
        zmin: f64,
        zmax: f64,
        theta_max: f64,
        params: Vec<Value>,
    ) -> Result<()> {
        self.write(
            Request::new("Sphere")
                .arg(radius)
                .arg(zmin)
                .arg(zmax)
                .arg(theta_max)
                .params(params),
        )
    }

    /// The vertex count is implied by the `"P"` parameter
    pub fn polygon(&mut self, params: Vec<Value>) -> Result<()> {
        self.write(Request::new("Polygon").params(params))
    }

    pub fn general_polygon(&mut self, nverts: &[i32], params: Vec<Value>) -> Result<()> {
        self.write(
            Request::new("GeneralPolygon")
                .arg(Value::IntArray(nverts.to_vec()))
                .params(params),
        )
    }

    pub fn points_polygons(
        &mut self,
        nverts: &[i32],
        verts: &[i32],
        params: Vec<Value>,
    ) -> Result<()> {
        self.write(
            Request::new("PointsPolygons")
                .arg(Value::IntArray(nverts.to_vec()))
                .arg(Value::IntArray(verts.to_vec()))
                .params(params),
        )
    }

    pub fn points_general_polygons(
        &mut self,
        nloops: &[i32],
        nverts: &[i32],
        verts: &[i32],
        params: Vec<Value>,
    ) -> Result<()> {
        self.write(
            Request::new("PointsGeneralPolygons")
                .arg(Value::IntArray(nloops.to_vec()))
                .arg(Value::IntArray(nverts.to_vec()))
                .arg(Value::IntArray(verts.to_vec()))
                .params(params),
        )
    }

    #[allow(clippy::too_many_arguments)]
    pub fn make_texture(
        &mut self,
        picture: &str,
        texture: &str,
        swrap: &str,
        twrap: &str,
        filter: &str,
        swidth: f64,
        twidth: f64,
        params: Vec<Value>,
    ) -> Result<()> {
        self.write(
            Request::new("MakeTexture")
                .arg(Value::string(picture))
                .arg(Value::string(texture))
                .arg(Value::token(swrap))
                .arg(Value::token(twrap))
                .arg(Value::FilterFunc(filter.to_string()))
                .arg(swidth)
                .arg(twidth)
                .params(params),
        )
    }

    pub fn make_shadow(&mut self, picture: &str, texture: &str, params: Vec<Value>) -> Result<()> {
        self.write(
            Request::new("MakeShadow")
                .arg(Value::string(picture))
                .arg(Value::string(texture))
                .params(params),
        )
    }

    pub fn read_archive(&mut self, name: &str, params: Vec<Value>) -> Result<()> {
        self.write(Request::new("ReadArchive").arg(Value::token(name)).params(params))
    }

    /// Close the pipeline and its sink
    pub fn close(&mut self) -> Result<()> {
        self.pipeline.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rib::error::ErrorKind;
    use crate::rib::pipeline::{HandleFilter, PrettyPrinter, SharedBuffer, Sink, Timer};
    use crate::rib::lexing::{lex, Token};

    fn context() -> (Context, SharedBuffer) {
        let (sink, buffer) = Sink::buffer();
        (Context::new(Pipeline::new().append(sink)), buffer)
    }

    fn points() -> Value {
        Value::PointArray(vec![
            [0.0, 1.0, 0.0],
            [0.0, 1.0, 1.0],
            [0.0, 0.0, 1.0],
            [0.0, 0.0, 0.0],
        ])
    }

    #[test]
    fn test_geometric_requests() {
        let (mut ctx, buffer) = context();
        ctx.begin("geometric.rib").unwrap();
        ctx.comment("output from rib, context tests").unwrap();
        ctx.polygon(vec![Value::token("P"), points()]).unwrap();
        ctx.general_polygon(&[4, 3], vec![Value::token("P"), points()])
            .unwrap();
        ctx.points_polygons(
            &[3, 3, 3],
            &[0, 3, 2, 0, 1, 3, 1, 4, 3],
            vec![Value::token("P"), points()],
        )
        .unwrap();
        ctx.points_general_polygons(
            &[2, 2],
            &[4, 3, 4, 3],
            &[0, 1, 4, 3, 6, 7, 8, 1, 2, 5, 4, 9, 10, 11],
            vec![Value::token("P"), points()],
        )
        .unwrap();
        ctx.end().unwrap();
        ctx.close().unwrap();

        let lines: Vec<_> = buffer.contents().lines().map(str::to_string).collect();
        assert_eq!(
            lines,
            vec![
                "##RenderMan RIB-Structure 1.1",
                "# output from rib, context tests",
                r#"Polygon "P" [0 1 0 0 1 1 0 0 1 0 0 0]"#,
                r#"GeneralPolygon [4 3] "P" [0 1 0 0 1 1 0 0 1 0 0 0]"#,
                r#"PointsPolygons [3 3 3] [0 3 2 0 1 3 1 4 3] "P" [0 1 0 0 1 1 0 0 1 0 0 0]"#,
                r#"PointsGeneralPolygons [2 2] [4 3 4 3] [0 1 4 3 6 7 8 1 2 5 4 9 10 11] "P" [0 1 0 0 1 1 0 0 1 0 0 0]"#,
            ]
        );
    }

    #[test]
    fn test_archive_records() {
        let (mut ctx, buffer) = context();
        let frame = 7;
        ctx.archive_record(RecordKind::Comment, format_args!("frame {}", frame))
            .unwrap();
        ctx.archive_record(RecordKind::Structure, format_args!("Scene {}", "sphere"))
            .unwrap();
        ctx.archive_record(RecordKind::Verbatim, format_args!("Sphere 1 -1 1 360"))
            .unwrap();
        assert_eq!(
            buffer.contents(),
            "# frame 7\n## Scene sphere\nVerbatim Sphere 1 -1 1 360\n"
        );
    }

    #[test]
    fn test_multi_line_record_splits_per_line() {
        let (mut ctx, buffer) = context();
        ctx.comment("line one\nline two\r\n").unwrap();
        ctx.archive_record(RecordKind::Structure, format_args!("Scene\nFrames 1"))
            .unwrap();
        ctx.world_begin().unwrap();
        assert_eq!(
            buffer.contents(),
            "# line one\n# line two\n## Scene\n## Frames 1\nWorldBegin\n"
        );
        let tokens: Vec<Token> = lex(&buffer.contents()).collect::<Result<_>>().unwrap();
        let commands: Vec<_> = tokens.iter().filter_map(Token::command).collect();
        assert_eq!(commands, ["WorldBegin"]);
    }

    #[test]
    fn test_record_kind_from_str() {
        assert_eq!("comment".parse::<RecordKind>().unwrap(), RecordKind::Comment);
        assert_eq!("structure".parse::<RecordKind>().unwrap(), RecordKind::Structure);
        assert_eq!("verbatim".parse::<RecordKind>().unwrap(), RecordKind::Verbatim);
        let err = "note".parse::<RecordKind>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BadArgument);
    }

    #[test]
    fn test_version() {
        let (mut ctx, buffer) = context();
        ctx.version(3.04).unwrap();
        let err = ctx.version(4.0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BadVersion);
        assert_eq!(
            err.to_string(),
            "protocol version number mismatch: requested 4, supported 3.04"
        );
        assert_eq!(buffer.contents(), "version 3.04\n");
    }

    #[test]
    fn test_sphere_scene_pretty() {
        let (sink, buffer) = Sink::buffer();
        let mut ctx = Context::new(Pipeline::new().append(PrettyPrinter::new()).append(sink));
        ctx.display("sphere.tif", "file", "rgb", vec![]).unwrap();
        ctx.format(320, 240, 1.0).unwrap();
        ctx.translate(0.0, 0.0, 6.0).unwrap();
        ctx.world_begin().unwrap();
        ctx.projection("perspective", vec![Value::token("fov"), Value::Float(30.0)])
            .unwrap();
        ctx.color(&[1.0, 0.0, 0.0]).unwrap();
        ctx.sphere(1.0, -1.0, 1.0, 360.0, vec![]).unwrap();
        ctx.world_end().unwrap();
        insta::assert_snapshot!(buffer.contents(), @r###"
Display "sphere.tif" "file" "rgb"
Format 320 240 1
Translate 0 0 6
WorldBegin
    Projection "perspective" "fov" 30
    Color [1 0 0]
    Sphere 1 -1 1 360
WorldEnd
"###);
    }

    #[test]
    fn test_handles_are_interned() {
        let (sink, buffer) = Sink::buffer();
        let mut ctx = Context::new(Pipeline::new().append(HandleFilter::new()).append(sink));
        ctx.light_source("pointlight", "key", vec![]).unwrap();
        ctx.light_source("ambientlight", "fill", vec![]).unwrap();
        ctx.illuminate("key", false).unwrap();
        ctx.object_begin("teapot").unwrap();
        ctx.object_end().unwrap();
        ctx.object_instance("teapot").unwrap();
        assert_eq!(
            buffer.contents(),
            "LightSource \"pointlight\" 1\n\
             LightSource \"ambientlight\" 2\n\
             Illuminate 1 0\n\
             ObjectBegin 1\n\
             ObjectEnd\n\
             ObjectInstance 1\n"
        );
    }

    #[test]
    fn test_debug_barrier_reaches_timer_only() {
        let (sink, buffer) = Sink::buffer();
        let mut ctx = Context::new(Pipeline::new().append(Timer::new()).append(sink));
        ctx.world_begin().unwrap();
        ctx.debug_barrier("after world").unwrap();
        ctx.world_end().unwrap();
        assert_eq!(buffer.contents(), "WorldBegin\nWorldEnd\n");
        let timer = ctx.pipeline().stage::<Timer>().unwrap();
        assert_eq!(timer.checkpoints().len(), 1);
        assert_eq!(timer.checkpoints()[0].label, "after world");
    }

    #[test]
    fn test_texture_requests() {
        let (mut ctx, buffer) = context();
        ctx.make_texture("grid.tif", "grid.tex", "periodic", "clamp", "gaussian", 2.0, 2.0, vec![])
            .unwrap();
        ctx.make_shadow("depth.z", "shadow.tex", vec![]).unwrap();
        ctx.read_archive("scene.rib", vec![]).unwrap();
        assert_eq!(
            buffer.contents(),
            "MakeTexture \"grid.tif\" \"grid.tex\" \"periodic\" \"clamp\" \"gaussian\" 2 2\n\
             MakeShadow \"depth.z\" \"shadow.tex\"\n\
             ReadArchive \"scene.rib\"\n"
        );
    }

    #[test]
    fn test_write_after_close() {
        let (mut ctx, _buffer) = context();
        ctx.close().unwrap();
        let err = ctx.world_begin().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PipelineClosed);
    }

    #[test]
    fn test_generic_request() {
        let (mut ctx, buffer) = context();
        ctx.request(
            "Attribute",
            vec![Value::string("identifier")],
            vec![Value::token("name"), Value::StringArray(vec!["ball".to_string()])],
        )
        .unwrap();
        assert_eq!(
            buffer.contents(),
            "Attribute \"identifier\" \"name\" [\"ball\"]\n"
        );
    }
}
