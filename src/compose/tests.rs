#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use image::{Rgba, RgbaImage};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tiny_skia::{Pixmap, PremultipliedColorU8};

use super::card::with_truncation_mark;
use super::*;
use crate::asset::AssetError;
use crate::geometry::{DisplayRect, Point, RectF};
use crate::ink::{InkEngine, InkTool, StrokeSurface};
use crate::sticker::{FormFactor, StickerLayer};
use crate::text::fake::{BlockFont, BlockFonts, NoFonts};

const RED: [u8; 4] = [255, 0, 0, 255];

fn photo() -> ImageSource {
    ImageSource::Decoded(Arc::new(RgbaImage::from_pixel(60, 40, Rgba(RED))))
}

fn inputs(layout: LayoutMode) -> ComposeInputs {
    ComposeInputs {
        layout,
        background: Some(photo()),
        ..ComposeInputs::default()
    }
}

fn px(p: &Pixmap, x: u32, y: u32) -> PremultipliedColorU8 {
    p.pixel(x, y).unwrap()
}

fn is_red(c: PremultipliedColorU8) -> bool {
    c.red() > 200 && c.green() < 60 && c.blue() < 60
}

fn is_white(c: PremultipliedColorU8) -> bool {
    c.red() > 245 && c.green() > 245 && c.blue() > 245
}

#[test]
fn broken_background_is_an_asset_load_error() {
    let mut inputs = inputs(LayoutMode::SquareSocial);
    inputs.background = Some(ImageSource::Encoded(b"not an image".to_vec()));
    let err = compose(&inputs, &BlockFonts).unwrap_err();
    assert!(matches!(
        err,
        ComposeError::AssetLoad { asset: "background", source: AssetError::Decode(_) }
    ));
}

#[test]
fn broken_backdrop_is_an_asset_load_error() {
    let mut inputs = inputs(LayoutMode::SquareSocial);
    inputs.backdrop = Some(ImageSource::DataUrl("data:text/plain;base64,aGk=".into()));
    let err = render_composite(&inputs, &BlockFonts).unwrap_err();
    assert!(matches!(
        err,
        ComposeError::AssetLoad { asset: "backdrop", source: AssetError::UnsupportedMime(_) }
    ));
}

#[test]
fn front_side_insets_photo() {
    let card = render_side(&inputs(LayoutMode::Stacked), Side::Front, &NoFonts).unwrap();
    assert_eq!((card.width(), card.height()), (879, 591));
    assert!(is_white(px(&card, 5, 5)));
    assert!(is_red(px(&card, 20, 20)));
    assert!(is_red(px(&card, 439, 295)));
    assert!(is_white(px(&card, 875, 588)));
}

#[test]
fn front_side_carries_ink() {
    let geometry = CardGeometry::POSTCARD;
    let mut surface = StrokeSurface::with_width(&geometry, 1758).unwrap();
    let mut engine = InkEngine::new();
    engine.select_tool(Some(InkTool::Pencil));
    engine.set_color(crate::color::HexColor::rgb(0, 0, 255));
    assert!(engine.pointer_down(&surface, Point::new(200.0, 602.0)));
    engine.pointer_move(&mut surface, Point::new(1400.0, 602.0));

    let mut inputs = inputs(LayoutMode::Stacked);
    inputs.ink = Some(surface.pixmap().clone());
    let card = render_side(&inputs, Side::Front, &NoFonts).unwrap();

    // Surface maps onto the inset photo rect, so the stroke lands on row 300
    let c = px(&card, 400, 300);
    assert!(c.blue() > 150 && c.red() < 150, "ink pixel {c:?}");
}

#[test]
fn edge_to_edge_ink_stays_inside_padding() {
    let geometry = CardGeometry::POSTCARD;
    let mut surface = StrokeSurface::for_card(&geometry).unwrap();
    let mut engine = InkEngine::new();
    engine.select_tool(Some(InkTool::Marker));
    engine.set_color(crate::color::HexColor::rgb(0, 0, 255));
    assert!(engine.pointer_down(&surface, Point::new(0.0, 295.0)));
    assert!(engine.pointer_move(&mut surface, Point::new(879.0, 295.0)));

    let mut inputs = inputs(LayoutMode::Stacked);
    inputs.ink = Some(surface.pixmap().clone());
    let card = render_side(&inputs, Side::Front, &NoFonts).unwrap();

    assert!(is_white(px(&card, 5, 295)));
    assert!(is_white(px(&card, 873, 295)));
    let inside = px(&card, 20, 295);
    assert!(inside.blue() > 80 && !is_red(inside), "ink pixel {inside:?}");
}

#[test]
fn back_side_draws_guides_message_and_stickers() {
    let mut inputs = inputs(LayoutMode::Stacked);
    inputs.message = "Hello".into();

    let mut layer = StickerLayer::new(CardGeometry::POSTCARD, FormFactor::Desktop);
    let mut rng = StdRng::seed_from_u64(42);
    layer.enter_paste_mode_with_rng("🎈", &mut rng);
    let rect = DisplayRect::new(0.0, 0.0, 879.0, 591.0);
    layer.place_at_with_rng(Point::new(650.0, 400.0), &rect, &mut rng);
    inputs.back_stickers = layer.render_order().into_iter().cloned().collect();

    let card = render_side(&inputs, Side::Back, &BlockFonts).unwrap();
    let g = inputs.geometry;

    let divider = px(&card, g.divider_x() as u32, 300);
    assert!(divider.alpha() == 255 && divider.red() < 240);

    // First block of "Hello" at the column start, vertically inside line 0
    let column = g.message_rect();
    let line_height = inputs.style.line_height(inputs.line_height_ratio);
    let text = px(&card, column.x as u32 + 3, (column.y + line_height / 2.0) as u32);
    assert!(text.red() < 30, "text pixel {text:?}");

    // Sticker glyph is painted around its centre
    let sticker = px(&card, 650, 400);
    assert!(sticker.red() < 30, "sticker pixel {sticker:?}");
}

#[test]
fn overflow_marks_last_line() {
    let font = BlockFont { advance: 10.0 };
    assert_eq!(with_truncation_mark("The quick", 100.0, &font, 20.0), "The quick…");
    assert_eq!(with_truncation_mark("The quicker", 100.0, &font, 20.0), "The quick…");
    assert_eq!(with_truncation_mark("abcdefghij", 100.0, &font, 20.0), "abcdefghi…");
    assert_eq!(with_truncation_mark("ab cdefghij", 100.0, &font, 20.0), "ab cdefgh…");
}

#[test]
fn overlong_message_still_composes() {
    let mut inputs = inputs(LayoutMode::Stacked);
    inputs.message = "word ".repeat(2_000);
    let card = render_side(&inputs, Side::Back, &BlockFonts).unwrap();
    let column = inputs.geometry.message_rect();
    // Nothing is drawn below the column
    assert!(is_white(px(&card, column.x as u32 + 3, column.bottom() as u32 + 10)));
}

#[test]
fn square_social_composite() {
    let preview = compose(&inputs(LayoutMode::SquareSocial), &NoFonts).unwrap();
    assert_eq!((preview.width, preview.height), (1500, 1500));
    assert_eq!(preview.file_name(), "postcard-square-social.png");

    let decoded = image::load_from_memory(&preview.bytes).unwrap().to_rgba8();
    assert_eq!(decoded.get_pixel(5, 5).0, [255, 255, 255, 255]);
    let centre = decoded.get_pixel(700, 520).0;
    assert!(centre[0] > 200 && centre[1] < 60, "front centre {centre:?}");
}

/// A canvas point covered by the front photo and by the back card.
fn overlap_point(preset: &LayoutPreset, g: &CardGeometry) -> (u32, u32) {
    let local = |side: Side, x: f32, y: f32| {
        let p = preset.placement(side);
        let (cw, ch) = (
            (g.width * p.scale).round(),
            (g.height * p.scale).round(),
        );
        let inv = p.transform(cw, ch, p.scale).invert().unwrap();
        let mut pts = [tiny_skia::Point::from_xy(x, y)];
        inv.map_points(&mut pts);
        Point::new(pts[0].x / p.scale, pts[0].y / p.scale)
    };
    let shrink = |r: RectF, m: f32| RectF::new(r.x + m, r.y + m, r.width - 2.0 * m, r.height - 2.0 * m);
    let photo = shrink(g.image_rect(), 4.0);
    let back = shrink(g.bounds(), 4.0);

    for y in 600..900 {
        for x in (600..900).step_by(10) {
            let (fx, fy) = (x as f32 + 0.5, y as f32 + 0.5);
            if photo.contains(local(Side::Front, fx, fy)) && back.contains(local(Side::Back, fx, fy)) {
                return (x, y);
            }
        }
    }
    panic!("cards do not overlap");
}

#[test]
fn layering_decides_which_card_is_on_top() {
    let g = CardGeometry::POSTCARD;
    let preset = LayoutMode::SquareSocial.preset(&g);
    let (x, y) = overlap_point(&preset, &g);

    let mut front_on_top = inputs(LayoutMode::SquareSocial);
    front_on_top.layering = Layering::FrontOverBack;
    let canvas = render_composite(&front_on_top, &NoFonts).unwrap();
    assert!(is_red(px(&canvas, x, y)));

    let mut back_on_top = front_on_top.clone();
    back_on_top.layering = Layering::BackOverFront;
    let canvas = render_composite(&back_on_top, &NoFonts).unwrap();
    assert!(is_white(px(&canvas, x, y)));
}

#[test]
fn shadow_darkens_below_card() {
    let canvas = render_composite(&inputs(LayoutMode::Stacked), &BlockFonts).unwrap();
    // Just under the back card's bottom edge (y = 687 + 591)
    let below = px(&canvas, 455, 1280);
    assert!(below.red() < 255 && below.red() > 200, "shadow pixel {below:?}");
    assert!(is_white(px(&canvas, 455, 1330)));
}

#[test]
fn stacked_needs_a_title_font() {
    let err = compose(&inputs(LayoutMode::Stacked), &NoFonts).unwrap_err();
    assert!(matches!(err, ComposeError::Font(FontError::NotFound(_))));
}

#[test]
fn backdrop_is_cover_fitted() {
    let mut inputs = inputs(LayoutMode::SquareSocial);
    let blue = RgbaImage::from_pixel(30, 10, Rgba([0, 0, 255, 255]));
    inputs.backdrop = Some(ImageSource::Decoded(Arc::new(blue)));
    let canvas = render_composite(&inputs, &NoFonts).unwrap();
    for (x, y) in [(2, 2), (1497, 2), (2, 1497), (1497, 1497)] {
        let c = px(&canvas, x, y);
        assert!(c.blue() > 240 && c.red() < 20, "corner {x},{y}: {c:?}");
    }
}

#[test]
fn side_export_names_and_jpeg() {
    let mut inputs = inputs(LayoutMode::Stacked);
    let front = compose_side(&inputs, Side::Front, &NoFonts).unwrap();
    assert_eq!(front.file_name(), "postcard-front.png");

    inputs.format = ExportFormat::Jpeg;
    let back = compose_side(&inputs, Side::Back, &NoFonts).unwrap();
    assert_eq!(back.file_name(), "postcard-back.jpg");
    assert_eq!((back.width, back.height), (879, 591));
}

#[test]
fn a4_page_dimensions() {
    let canvas = render_composite(&inputs(LayoutMode::A4Print), &NoFonts).unwrap();
    assert_eq!((canvas.width(), canvas.height()), (2480, 3508));
    assert!(is_white(px(&canvas, 100, 100)));
    let p = LayoutMode::A4Print.preset(&CardGeometry::POSTCARD);
    assert!(is_red(px(&canvas, 1240, p.front.center.y as u32)));
}
