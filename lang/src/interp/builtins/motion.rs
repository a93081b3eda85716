use super::eager;
use crate::interp::procedure::Properties;
use crate::interp::runtime::{Interpreter, Outcome};
use crate::interp::value::Value;

pub(super) fn register(interp: &mut Interpreter) {
    // Motion
    eager(interp, &["forward", "fd"], Properties::fixed(1), |interp, args| {
        let distance = interp.number_input(&args[0])?;
        interp.turtle.move_by(distance);
        Ok(None)
    });
    eager(interp, &["back", "bk"], Properties::fixed(1), |interp, args| {
        let distance = interp.number_input(&args[0])?;
        interp.turtle.move_by(-distance);
        Ok(None)
    });
    eager(interp, &["left", "lt"], Properties::fixed(1), |interp, args| {
        let degrees = interp.number_input(&args[0])?;
        interp.turtle.turn(-degrees);
        Ok(None)
    });
    eager(interp, &["right", "rt"], Properties::fixed(1), |interp, args| {
        let degrees = interp.number_input(&args[0])?;
        interp.turtle.turn(degrees);
        Ok(None)
    });
    eager(interp, &["setpos"], Properties::fixed(1), |interp, args| {
        let (x, y) = interp.point_input(&args[0])?;
        interp.turtle.set_position(x, y);
        Ok(None)
    });
    eager(interp, &["setxy"], Properties::fixed(2), |interp, args| {
        let x = interp.number_input(&args[0])?;
        let y = interp.number_input(&args[1])?;
        interp.turtle.set_position(x, y);
        Ok(None)
    });
    eager(interp, &["setx"], Properties::fixed(1), |interp, args| {
        let x = interp.number_input(&args[0])?;
        let y = interp.turtle.y();
        interp.turtle.set_position(x, y);
        Ok(None)
    });
    eager(interp, &["sety"], Properties::fixed(1), |interp, args| {
        let y = interp.number_input(&args[0])?;
        let x = interp.turtle.x();
        interp.turtle.set_position(x, y);
        Ok(None)
    });
    eager(
        interp,
        &["setheading", "seth"],
        Properties::fixed(1),
        |interp, args| {
            let heading = interp.number_input(&args[0])?;
            interp.turtle.set_heading(heading);
            Ok(None)
        },
    );
    eager(interp, &["home"], Properties::fixed(0), |interp, _| {
        interp.turtle.home();
        Ok(None)
    });
    eager(interp, &["arc"], Properties::fixed(2), |interp, args| {
        let angle = interp.number_input(&args[0])?;
        let radius = interp.number_input(&args[1])?;
        interp.turtle.arc(angle, radius);
        Ok(None)
    });

    // Queries
    eager(interp, &["pos"], Properties::fixed(0), |interp, _| {
        let (x, y) = (interp.turtle.x(), interp.turtle.y());
        Ok(Some(Value::list([Value::number(x), Value::number(y)])))
    });
    eager(interp, &["xcor"], Properties::fixed(0), |interp, _| {
        Ok(Some(Value::number(interp.turtle.x())))
    });
    eager(interp, &["ycor"], Properties::fixed(0), |interp, _| {
        Ok(Some(Value::number(interp.turtle.y())))
    });
    eager(interp, &["heading"], Properties::fixed(0), |interp, _| {
        Ok(Some(Value::number(interp.turtle.heading())))
    });
    eager(interp, &["towards"], Properties::fixed(1), |interp, args| {
        let (x, y) = interp.point_input(&args[0])?;
        Ok(Some(Value::number(interp.turtle.towards(x, y))))
    });

    // Pen and screen
    eager(interp, &["clearscreen", "cs"], Properties::fixed(0), |interp, _| {
        interp.turtle.clear_screen();
        Ok(None)
    });
    eager(interp, &["pendown", "pd"], Properties::fixed(0), |interp, _| {
        interp.turtle.set_pen_down(true);
        Ok(None)
    });
    eager(interp, &["penup", "pu"], Properties::fixed(0), |interp, _| {
        interp.turtle.set_pen_down(false);
        Ok(None)
    });
    eager(
        interp,
        &["pendownp", "pendown?"],
        Properties::fixed(0),
        |interp, _| Ok(Some(Value::boolean(interp.turtle.is_pen_down()))),
    );
    eager(
        interp,
        &["buttonp", "button?", "button"],
        Properties::fixed(0),
        |interp, _| Ok(Some(Value::boolean(interp.turtle.is_button_pressed()))),
    );
    eager(
        interp,
        &["setpencolor", "setpc", "setcolor"],
        Properties::fixed(1),
        |interp, args| {
            interp.turtle.set_color(&args[0]);
            Ok(None)
        },
    );
    eager(interp, &["hideturtle", "ht"], Properties::fixed(0), none);
    eager(interp, &["showturtle", "st"], Properties::fixed(0), none);

    // Timing and sound
    eager(interp, &["wait"], Properties::fixed(1), |interp, args| {
        let seconds = interp.number_input(&args[0])?;
        interp.turtle.wait(seconds);
        Ok(None)
    });
    eager(interp, &["beep"], Properties::fixed(0), |interp, _| {
        interp.turtle.tone(5300.0, 0.3);
        Ok(None)
    });
}

fn none(_: &mut Interpreter, _: Vec<Value>) -> Outcome {
    Ok(None)
}
