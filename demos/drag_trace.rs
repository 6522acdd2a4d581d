use sfoglia::prelude::*;

fn main() {
    env_logger::init();

    let mut pager = Pager::new(3)
        .viewport_width(360.0)
        .on_change_index(|index| println!("-> settled on panel {index}"))
        .measure_height(|index| Some(200.0 + index as f32 * 40.0));

    // A quick leftward flick across the first panel
    pager.handle_event(&PointerEvent::Down { x: 300.0, y: 40.0 });
    for step in 1..=6 {
        let x = 300.0 - step as f32 * 18.0;
        pager.handle_event(&PointerEvent::Move { x, y: 40.0 });
    }
    pager.handle_event(&PointerEvent::Up);

    // Play the springs out at 60 fps and print what the renderer would see
    let mut frames = 0;
    while frames < 240 {
        if let AdvanceResult::Changed(frame) = pager.tick(1.0 / 60.0) {
            println!(
                "offset {:7.2}%  height {:6.1}px",
                frame.offset_percent, frame.height
            );
        }
        if !pager.is_animating() {
            break;
        }
        frames += 1;
    }
}
