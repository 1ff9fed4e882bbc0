use std::io::Cursor;

use studio_editor::telemetry::init_tracing;
use studio_editor::{Editor, EditorConfig, NoticeLevel, ShapeTool, TextPreset, ToolError};
use studio_history::Scene;
use studio_scene::{Color, DocumentScene, Filter, ObjectKind, Point};

fn png(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([10, 120, 200, 255]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).unwrap();
    out.into_inner()
}

fn open() -> (Editor<DocumentScene>, studio_editor::ToolState) {
    init_tracing();
    Editor::open(&EditorConfig::default(), 1280).unwrap()
}

fn snapshot(editor: &Editor<DocumentScene>) -> studio_history::Snapshot {
    editor.scene().serialize().unwrap()
}

#[test]
fn image_then_text_undo_redo() {
    let (mut editor, _tools) = open();
    let s0 = snapshot(&editor);
    assert!(!editor.can_undo());
    assert!(!editor.can_redo());

    let image = editor.upload_image(png(100, 50)).unwrap();
    let s1 = snapshot(&editor);
    editor.add_text(TextPreset::Header);
    let s2 = snapshot(&editor);

    assert_eq!(editor.history().entries(), &[s0.clone(), s1.clone(), s2][..]);
    assert_eq!(editor.history().cursor(), 2);

    let bounds = editor.scene().object(image).unwrap().bounds();
    assert!((bounds.width - 480.0).abs() < 1e-3, "width {}", bounds.width);
    assert!((bounds.x + bounds.width / 2.0 - 300.0).abs() < 1e-3);

    assert!(pollster::block_on(editor.undo()));
    assert_eq!(editor.history().cursor(), 1);
    assert_eq!(snapshot(&editor), s1);

    assert!(pollster::block_on(editor.undo()));
    assert_eq!(snapshot(&editor), s0);
    assert!(!pollster::block_on(editor.undo()));

    assert!(pollster::block_on(editor.redo()));
    assert_eq!(editor.history().cursor(), 1);
    assert_eq!(snapshot(&editor), s1);
    assert_eq!(editor.history().len(), 3);
}

#[test]
fn every_style_change_is_undoable() {
    let (mut editor, mut tools) = open();
    let text = editor.add_text(TextPreset::Sidebar);
    assert!(editor.selection_panel().text_controls);

    assert!(editor.set_text_color(Color::rgb(255, 0, 0)));
    assert!(editor.set_font_family("Georgia"));
    assert!(editor.rotate_active());
    assert_eq!(editor.history().len(), 5);

    pollster::block_on(editor.undo());
    pollster::block_on(editor.undo());
    match &editor.scene().object(text).unwrap().kind {
        ObjectKind::Text(t) => {
            assert_eq!(t.fill, Color::rgb(255, 0, 0));
            assert_eq!(t.font_family, "Arial");
        }
        other => panic!("expected text, got {other:?}"),
    }

    // Restores drop the selection, so a shape color only updates the tool.
    assert!(!editor.set_shape_color(&mut tools, Color::rgb(0, 255, 0)));
    let rect = editor.add_shape(&tools, ShapeTool::Rect);
    match &editor.scene().object(rect).unwrap().kind {
        ObjectKind::Shape(s) => assert_eq!(s.fill, Color::rgb(0, 255, 0)),
        other => panic!("expected shape, got {other:?}"),
    }
    assert!(!editor.can_redo());
}

#[test]
fn filter_requires_an_image() {
    let (mut editor, _tools) = open();
    editor.add_sticker("⭐");
    assert!(!editor.selection_panel().text_controls);

    let err = editor.apply_filter(Filter::Grayscale).unwrap_err();
    assert!(matches!(err, ToolError::NoImageSelected));
    let notices = editor.take_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Warning);
    assert_eq!(notices[0].message, "Select an image first!");

    let photo = editor.upload_image(png(8, 8)).unwrap();
    editor.apply_filter(Filter::Sepia).unwrap();
    editor.apply_filter(Filter::Invert).unwrap();
    match &editor.scene().object(photo).unwrap().kind {
        ObjectKind::Image(img) => assert_eq!(img.filters, vec![Filter::Invert]),
        other => panic!("expected image, got {other:?}"),
    }
    assert_eq!(editor.history().len(), 5);
}

#[test]
fn crop_template_and_drawing() {
    let (mut editor, mut tools) = open();
    assert_eq!(editor.crop_to_square().unwrap(), 600);
    assert_eq!(editor.take_notices()[0].message, "Canvas cropped to square!");

    editor.add_shape(&tools, ShapeTool::Circle);
    editor.apply_template("Birthday");
    assert_eq!(editor.scene().objects().len(), 1);
    assert_eq!(editor.history().len(), 4);

    assert!(matches!(
        editor.draw_stroke(&tools, vec![Point::new(1.0, 1.0)]),
        Err(ToolError::NotDrawing)
    ));
    assert!(editor.toggle_drawing(&mut tools));
    assert!(matches!(
        editor.draw_stroke(&tools, Vec::new()),
        Err(ToolError::EmptyStroke)
    ));
    editor
        .draw_stroke(&tools, vec![Point::new(10.0, 10.0), Point::new(40.0, 25.0)])
        .unwrap();
    assert_eq!(editor.history().len(), 5);

    pollster::block_on(editor.undo());
    pollster::block_on(editor.undo());
    assert_eq!(editor.scene().objects().len(), 1);
    assert_eq!(editor.scene().width(), 600);
}

#[test]
fn drag_records_only_the_settled_position() {
    let (mut editor, _tools) = open();
    let id = editor.add_text(TextPreset::Sidebar);
    let steps = [(1.0, 0.0); 25];
    assert!(editor.drag_active(&steps).unwrap());
    assert_eq!(editor.history().len(), 3);
    assert_eq!(editor.scene().object(id).unwrap().left, 75.0);

    pollster::block_on(editor.undo());
    assert_eq!(editor.scene().object(id).unwrap().left, 50.0);
}

#[test]
fn drag_without_movement_is_not_recorded() {
    let (mut editor, _tools) = open();
    editor.add_text(TextPreset::Sidebar);
    assert!(!editor.drag_active(&[]).unwrap());
    assert!(!editor.drag_active(&[(3.0, 0.0), (-3.0, 0.0)]).unwrap());
    assert_eq!(editor.history().len(), 2);
    assert_eq!(editor.history().current(), &snapshot(&editor));
}

#[test]
fn non_finite_stroke_keeps_history_undoable() {
    let (mut editor, mut tools) = open();
    editor.toggle_drawing(&mut tools);
    let err = editor
        .draw_stroke(&tools, vec![Point::new(f32::NAN, 1.0), Point::new(2.0, 2.0)])
        .unwrap_err();
    assert!(matches!(err, ToolError::NonFiniteStroke));
    assert!(editor.scene().objects().is_empty());

    let id = editor.add_text(TextPreset::Sidebar);
    assert!(editor.drag_active(&[(f32::INFINITY, 0.0)]).is_err());
    assert_eq!(editor.scene().object(id).unwrap().left, 50.0);
    assert_eq!(editor.history().len(), 2);

    assert!(pollster::block_on(editor.undo()));
    assert!(editor.scene().objects().is_empty());
    assert!(editor.notices().is_empty());
}

#[test]
fn image_snapshot_embeds_base64() {
    let (mut editor, _tools) = open();
    let bytes = png(64, 64);
    editor.upload_image(bytes.clone()).unwrap();

    let snap = snapshot(&editor);
    let json: serde_json::Value = serde_json::from_str(snap.as_str()).unwrap();
    let data = json["objects"][0]["data"].as_str().unwrap();
    assert_eq!(data.len(), bytes.len().div_ceil(3) * 4);
}

#[test]
fn viewport_resize_is_not_an_undo_step() {
    let (mut editor, tools) = open();
    assert!(editor.viewport_resized(&tools, 500));
    assert_eq!(editor.scene().width(), 460);
    assert!(!editor.viewport_resized(&tools, 1200));
    assert_eq!(editor.history().len(), 1);
}

#[test]
fn export_hides_selection() {
    let (mut editor, _tools) = open();
    editor.add_text(TextPreset::Header);
    let config = EditorConfig::default();
    let job = editor.export(&config.export, "target/exports");

    assert!(job.path.ends_with("creative-studio-edit.png"));
    assert!(!job.frame.has_selection());
    assert_eq!(job.frame.items.len(), 1);
    assert_eq!((job.frame.width, job.frame.height), (600, 780));
    assert!(editor.scene().active().is_none());
}

#[test]
fn bad_upload_raises_notice() {
    let (mut editor, _tools) = open();
    assert!(editor.upload_image(b"not an image".to_vec()).is_err());
    assert_eq!(editor.notices().len(), 1);
    assert_eq!(editor.history().len(), 1);
}
