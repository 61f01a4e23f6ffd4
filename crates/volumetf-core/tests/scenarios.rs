//! End-to-end editing scenarios through the public session API.

use std::cell::RefCell;
use std::rc::Rc;

use volumetf_core::edit::{Button, Modifiers, PointerEvent, TfChange, WidgetDelta};
use volumetf_core::shape::rectangular::Rectangular;
use volumetf_core::widget::ParamValue;
use volumetf_core::{
    BlendMode, ControlPoint, ScreenPoint, SessionConfig, Shape, TfMode, TfSession, Viewport,
    Volume, Widget, WidgetKind, WidgetSet,
};

fn session_with_log(config: SessionConfig) -> (TfSession, Rc<RefCell<Vec<TfChange>>>) {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    let session = TfSession::with_config(
        Volume::empty(),
        move |change: &TfChange| sink.borrow_mut().push(change.clone()),
        config,
    );
    (session, log)
}

#[test]
fn curve_lut_interpolates_between_points() {
    let (mut session, log) = session_with_log(SessionConfig::default());
    session.restore_curve(vec![
        ControlPoint::white(0.0, 0.0),
        ControlPoint::white(128.0, 0.5),
        ControlPoint::white(255.0, 1.0),
    ]);

    let lut = session.sample_lut();
    let entry = lut.entry(64).unwrap();
    assert!((entry.opacity - 0.25).abs() < 1e-3);
    assert_eq!(lut.flatten().len(), 256 * 5);

    match &log.borrow()[0] {
        TfChange::Curve { positions, .. } => assert_eq!(positions, &vec![0.0, 128.0, 255.0]),
        other => panic!("unexpected change {:?}", other),
    };
}

#[test]
fn gaussian_widget_peaks_at_center() {
    let (mut session, _) = session_with_log(SessionConfig::default());
    session.clear_widgets();
    session
        .create_widget(
            WidgetKind::Gaussian,
            None,
            &[
                ("center_intensity", ParamValue::Number(128.0)),
                ("center_gradient", ParamValue::Number(128.0)),
            ],
        )
        .unwrap();

    let widgets = session.widget_editor().widgets();
    assert_eq!(widgets.combined_opacity(128.0, 128.0), 1.0);
    assert!(widgets.combined_opacity(218.0, 128.0) < 0.05);
}

#[test]
fn multiply_widgets_compound() {
    let rect = |scale: f32| {
        Widget::new(Shape::Rectangular(Rectangular::default()))
            .with_center(100.0, 100.0)
            .with_opacity(scale)
            .with_blend_mode(BlendMode::Multiply)
    };
    let set: WidgetSet = vec![rect(0.5), rect(0.5)].into_iter().collect();
    assert!((set.combined_opacity(100.0, 100.0) - 0.75).abs() < 1e-6);
}

#[test]
fn dragging_first_point_keeps_it_pinned() {
    let (mut session, log) = session_with_log(SessionConfig::default());
    // 40 px histogram gutter, then a 255 px plot
    session.set_curve_viewport(Viewport::new(295.0, 100.0));

    session.handle_curve_event(PointerEvent::Press {
        pos: ScreenPoint::new(40.0, 100.0),
        button: Button::Primary,
        modifiers: Modifiers::NONE,
        double_click: false,
    });
    assert!(session.handle_curve_event(PointerEvent::Motion {
        pos: ScreenPoint::new(240.0, 40.0),
    }));
    session.handle_curve_event(PointerEvent::Release {
        pos: ScreenPoint::new(240.0, 40.0),
    });

    let first = session.curve().points()[0];
    assert_eq!(first.position, 0.0);
    assert!((first.opacity - 0.6).abs() < 1e-4);
    assert_eq!(log.borrow().len(), 1);
}

#[test]
fn widget_mode_round_trip() {
    let (mut session, log) = session_with_log(SessionConfig::default());
    session.set_mode(TfMode::Widgets);
    let index = session
        .create_widget(WidgetKind::Gaussian, Some("bone"), &[])
        .unwrap();
    session.remove_widget(index).unwrap();
    assert!(session.remove_widget(index).is_err());

    assert_eq!(
        *log.borrow(),
        vec![
            TfChange::widgets(WidgetDelta::Added(1)),
            TfChange::widgets(WidgetDelta::Removed(1)),
        ]
    );

    let first = session.sample_lut();
    let second = session.sample_lut();
    assert_eq!(first, second);
}
