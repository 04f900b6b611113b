use glyph_brush::{
    ab_glyph::{Font, FontArc, PxScale, ScaleFont},
    BrushAction, BrushError, Extra, FontId, GlyphBrushBuilder, GlyphCruncher, Layout, Section,
    Text,
};
use miniquad::*;
use palette::LinSrgba;
use silica::{Drawable, IRect, Image};

use crate::{
    math::{IVec2, Vec2},
    two::Rect,
    RenderingContext, Texture,
};

/// Offset of the drop shadow behind control text.
const SHADOW_OFFSET: Vec2 = Vec2::new(1., 1.);

#[derive(Clone)]
#[repr(C)]
struct Quad {
    rect: [f32; 4],
    uv: [f32; 4],
    color: [f32; 4],
}

type GlyphBrush = glyph_brush::GlyphBrush<(Quad, usize)>;

mod shader {
    use crate::math::Vec2;
    use miniquad::*;

    pub const VERTEX: &str = r#"#version 100
    const vec2 FLIP_Y = vec2(1.0, -1.0);

    attribute vec2 vert_pos;

    attribute vec4 inst_rect;
    attribute vec4 inst_uv;
    attribute vec4 inst_color;

    uniform vec2 screen_size;

    varying lowp vec2 texcoord;
    varying lowp vec4 color;

    void main() {
        vec2 pos = inst_rect.xy + (vert_pos * inst_rect.zw);
        gl_Position = vec4((pos / screen_size * 2.0 - 1.0) * FLIP_Y, 0.0, 1.0);
        texcoord = inst_uv.xy + (vert_pos * inst_uv.zw);
        color = inst_color;
    }"#;

    pub const FRAGMENT: &str = r#"#version 100
    varying lowp vec2 texcoord;
    varying lowp vec4 color;

    uniform sampler2D tex;
    uniform sampler2D mask;

    void main() {
        mediump float alpha = texture2D(mask, texcoord).r;
        if (alpha <= 0.0) {
            discard;
        }
        gl_FragColor = texture2D(tex, texcoord) * color * vec4(1.0, 1.0, 1.0, alpha);
    }"#;

    pub fn meta() -> ShaderMeta {
        ShaderMeta {
            images: vec!["tex".to_string(), "mask".to_string()],
            uniforms: UniformBlockLayout {
                uniforms: vec![UniformDesc::new("screen_size", UniformType::Float2)],
            },
        }
    }

    pub fn attributes() -> [VertexAttribute; 4] {
        [
            VertexAttribute::with_buffer("vert_pos", VertexFormat::Float2, 0),
            VertexAttribute::with_buffer("inst_rect", VertexFormat::Float4, 1),
            VertexAttribute::with_buffer("inst_uv", VertexFormat::Float4, 1),
            VertexAttribute::with_buffer("inst_color", VertexFormat::Float4, 1),
        ]
    }

    #[repr(C)]
    pub struct Uniforms {
        pub screen_size: Vec2,
    }
}

struct GlyphLayer {
    layer: usize,
    combine: bool,
}

impl GlyphLayer {
    fn new() -> Self {
        GlyphLayer {
            layer: 0,
            combine: true,
        }
    }
    fn next(&mut self) -> usize {
        if !self.combine {
            self.layer += 1;
            self.combine = true;
        }
        self.layer
    }
    fn finish(&mut self) {
        self.combine = false;
    }
    fn reset(&mut self) {
        self.combine = true;
        self.layer = 0;
    }
}

enum InstanceRange {
    Instances(TextureId, std::ops::Range<usize>),
    Text(usize),
}

pub struct QuadRenderer {
    pixel_perfect: bool,
    instances: Vec<Quad>,
    instance_ranges: Vec<InstanceRange>,
    screen_size: Vec2,
    font_size: f32,
    pipeline: Pipeline,
    vertex_buffer: BufferId,
    instance_buffer: BufferId,
    index_buffer: BufferId,
    white_pixel: Texture,
    glyph_brush: GlyphBrush,
    glyph_texture: TextureId,
    glyph_layer: GlyphLayer,
    glyph_instances: Vec<Vec<Quad>>,
}

impl QuadRenderer {
    fn create_glyph_texture(
        context: &mut RenderingContext,
        (width, height): (u32, u32),
    ) -> TextureId {
        context.new_texture(
            TextureAccess::Static,
            TextureSource::Empty,
            TextureParams {
                kind: TextureKind::Texture2D,
                format: TextureFormat::Alpha,
                wrap: TextureWrap::Clamp,
                min_filter: FilterMode::Linear,
                mag_filter: FilterMode::Linear,
                mipmap_filter: MipmapFilterMode::None,
                width,
                height,
                allocate_mipmaps: false,
            },
        )
    }

    pub fn new(
        context: &mut RenderingContext,
        fonts: Vec<FontArc>,
        font_size: f32,
        pixel_perfect: bool,
    ) -> Self {
        let vertices: [Vec2; 4] = [
            Vec2 { x: 0., y: 0. },
            Vec2 { x: 1., y: 0. },
            Vec2 { x: 1., y: 1. },
            Vec2 { x: 0., y: 1. },
        ];
        let vertex_buffer = context.new_buffer(
            BufferType::VertexBuffer,
            BufferUsage::Immutable,
            BufferSource::slice(&vertices),
        );
        let indices: [u16; 6] = [0, 1, 2, 0, 2, 3];
        let index_buffer = context.new_buffer(
            BufferType::IndexBuffer,
            BufferUsage::Immutable,
            BufferSource::slice(&indices),
        );

        let instance_buffer = context.new_buffer(
            BufferType::VertexBuffer,
            BufferUsage::Stream,
            BufferSource::empty::<Quad>(1024),
        );

        let shader = context
            .new_shader(
                ShaderSource::Glsl {
                    vertex: shader::VERTEX,
                    fragment: shader::FRAGMENT,
                },
                shader::meta(),
            )
            .unwrap_or_else(|error| panic!("could not compile quad shader: {error:?}"));
        let pipeline = context.new_pipeline(
            &[
                BufferLayout::default(),
                BufferLayout {
                    step_func: VertexStep::PerInstance,
                    ..Default::default()
                },
            ],
            &shader::attributes(),
            shader,
            PipelineParams {
                color_blend: Some(BlendState::new(
                    Equation::Add,
                    BlendFactor::Value(BlendValue::SourceAlpha),
                    BlendFactor::OneMinusValue(BlendValue::SourceAlpha),
                )),
                ..Default::default()
            },
        );
        let white_pixel = Texture::new_rgba8(context, 1, 1, &[255; 4]);
        let glyph_brush = GlyphBrushBuilder::using_fonts(fonts).build();
        let glyph_texture = Self::create_glyph_texture(context, glyph_brush.texture_dimensions());

        QuadRenderer {
            pixel_perfect,
            instances: Vec::new(),
            instance_ranges: Vec::new(),
            screen_size: Vec2::ONE,
            font_size,
            pipeline,
            vertex_buffer,
            instance_buffer,
            index_buffer,
            white_pixel,
            glyph_brush,
            glyph_texture,
            glyph_layer: GlyphLayer::new(),
            glyph_instances: Vec::new(),
        }
    }

    pub fn set_screen_size(&mut self, width: f32, height: f32) {
        self.screen_size = Vec2::new(width, height);
    }

    /// Unknown font indices fall back to the first font.
    fn font_id(&self, font_index: usize) -> FontId {
        if font_index < self.glyph_brush.fonts().len() {
            FontId(font_index)
        } else {
            log::warn!("font index {font_index} out of range, using font 0");
            FontId(0)
        }
    }

    fn transform(&self, mut rect: Rect) -> Rect {
        if self.pixel_perfect {
            rect.position.x = rect.position.x.round();
            rect.position.y = rect.position.y.round();
            rect.size.x = rect.size.x.floor();
            rect.size.y = rect.size.y.floor();
        }
        rect
    }
    fn process_queued_text(&mut self, context: &mut RenderingContext) {
        let mut brush_action;
        loop {
            brush_action = self.glyph_brush.process_queued(
                |rect, tex_data| {
                    // Update part of gpu texture with new glyph alpha values
                    context.texture_update_part(
                        self.glyph_texture,
                        rect.min[0] as i32,
                        rect.min[1] as i32,
                        rect.width() as i32,
                        rect.height() as i32,
                        tex_data,
                    );
                },
                |glyph_vertex| {
                    let pos: Rect = glyph_vertex.pixel_coords.into();
                    let uv: Rect = glyph_vertex.tex_coords.into();
                    let color = glyph_vertex.extra.color;
                    (
                        Quad {
                            rect: pos.into(),
                            uv: uv.into(),
                            color,
                        },
                        glyph_vertex.extra.z as usize,
                    )
                },
            );

            // If the cache texture is too small to fit all the glyphs, resize and try again
            match brush_action {
                Ok(_) => break,
                Err(BrushError::TextureTooSmall { suggested, .. }) => {
                    // Recreate texture as a larger size to fit more
                    log::debug!("resizing glyph texture to {}x{}", suggested.0, suggested.1);
                    self.glyph_texture = Self::create_glyph_texture(context, suggested);
                    self.glyph_brush.resize_texture(suggested.0, suggested.1);
                }
            }
        }

        // If the text has changed from what was last drawn, store new instances
        match brush_action {
            Ok(BrushAction::Draw(instances)) => {
                self.glyph_instances.clear();
                self.glyph_instances
                    .resize(self.glyph_layer.layer + 1, Vec::new());
                for instance in instances {
                    self.glyph_instances[instance.1].push(instance.0);
                }
            }
            Ok(BrushAction::ReDraw) | Err(_) => {}
        }
    }

    fn queue_texture(&mut self, texture: &Texture, rect: IRect, tint: LinSrgba) {
        let texture = texture.id();
        let rect = self.transform(rect.into());
        if rect.width() <= 0. || rect.height() <= 0. || rect.is_offscreen(self.screen_size) {
            return;
        }

        self.glyph_layer.finish();
        self.instances.push(Quad {
            rect: rect.into(),
            uv: [0., 0., 1., 1.],
            color: tint.into(),
        });
        let end = self.instances.len();
        let mut appended = false;
        if let Some(InstanceRange::Instances(instance_texture, range)) =
            self.instance_ranges.last_mut()
        {
            if *instance_texture == texture {
                range.end = end;
                appended = true;
            }
        }
        if !appended {
            let start = end - 1;
            self.instance_ranges
                .push(InstanceRange::Instances(texture, start..end));
        }
    }
    fn queue_text(&mut self, text: &str, font: FontId, position: Vec2, color: LinSrgba) {
        let layer = self.glyph_layer.next();
        let mut position = position;
        if self.pixel_perfect {
            position = position.round();
        }
        let text = Text {
            text,
            scale: PxScale::from(self.font_size),
            font_id: font,
            extra: Extra {
                color: color.into(),
                z: layer as f32,
            },
        };
        self.glyph_brush.queue(single_line(position, text));
        if !matches!(self.instance_ranges.last(), Some(InstanceRange::Text(_))) {
            self.instance_ranges.push(InstanceRange::Text(layer));
        }
    }
    pub fn render(&mut self, context: &mut RenderingContext) {
        self.process_queued_text(context);
        context.apply_pipeline(&self.pipeline);
        context.apply_uniforms(UniformsSource::table(&shader::Uniforms {
            screen_size: self.screen_size,
        }));
        let white_pixel = self.white_pixel.id();
        let mut bindings = Bindings {
            vertex_buffers: vec![self.vertex_buffer, self.instance_buffer],
            index_buffer: self.index_buffer,
            images: vec![white_pixel, white_pixel],
        };
        for instance_range in self.instance_ranges.drain(..) {
            let num_instances = match instance_range {
                InstanceRange::Instances(texture, range) => {
                    bindings.images[0] = texture;
                    bindings.images[1] = white_pixel;
                    let len = range.len();
                    context.buffer_update(
                        self.instance_buffer,
                        BufferSource::slice(&self.instances[range]),
                    );
                    len
                }
                InstanceRange::Text(layer) => {
                    bindings.images[0] = white_pixel;
                    bindings.images[1] = self.glyph_texture;
                    let instances = &self.glyph_instances[layer];
                    context.buffer_update(self.instance_buffer, BufferSource::slice(instances));
                    instances.len()
                }
            };
            context.apply_bindings(&bindings);
            context.draw(0, 6, num_instances.try_into().unwrap_or(i32::MAX));
        }
        self.instances.clear();
        self.glyph_layer.reset();
    }
    pub fn render_pass(&mut self, context: &mut RenderingContext) {
        context.begin_default_pass(Default::default());
        self.render(context);
        context.end_render_pass();
    }
}

fn single_line(position: Vec2, text: Text<'_>) -> Section<'_> {
    Section {
        screen_position: (position.x, position.y),
        bounds: (f32::INFINITY, f32::INFINITY),
        layout: Layout::default_single_line(),
        text: vec![text],
    }
}

impl silica::Renderer for QuadRenderer {
    fn draw_texture(&mut self, image: &Image, rect: IRect, tint: LinSrgba) {
        let Some(texture) = image.as_any().downcast_ref::<Texture>() else {
            log::warn!("cannot draw an image that was not loaded by this renderer");
            return;
        };
        self.queue_texture(texture, rect, tint);
    }

    fn draw_text_with_shadow(&mut self, text: &str, font_index: usize, position: IVec2, color: LinSrgba) {
        if text.is_empty() {
            return;
        }
        let font = self.font_id(font_index);
        let position = position.as_vec2();
        let shadow = LinSrgba::new(0., 0., 0., color.alpha);
        self.queue_text(text, font, position + SHADOW_OFFSET, shadow);
        self.queue_text(text, font, position, color);
    }
}

impl silica::TextMeasure for QuadRenderer {
    /// Width of the laid out glyphs by the font's line height.
    fn measure_text(&mut self, text: &str, font_index: usize) -> Vec2 {
        if text.is_empty() {
            return Vec2::ZERO;
        }
        let font = self.font_id(font_index);
        let scale = PxScale::from(self.font_size);
        let text = Text {
            text,
            scale,
            font_id: font,
            extra: Extra::default(),
        };
        let width = self
            .glyph_brush
            .glyph_bounds(single_line(Vec2::ZERO, text))
            .map(|bounds| bounds.width())
            .unwrap_or(0.);
        let height = self
            .glyph_brush
            .fonts()
            .get(font.0)
            .map(|font| {
                let font = font.as_scaled(scale);
                font.ascent() - font.descent()
            })
            .unwrap_or(0.);
        Vec2::new(width.ceil(), height.ceil())
    }
}
