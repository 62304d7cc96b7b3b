use rdev::Key;

/// Normalize a key name taken from an OSC address.
/// The GUI aliases are mapped to the windows-key names the injection layer
/// understands; everything else passes through unchanged.
pub fn normalize_key_name(raw: &str) -> String {
    if raw.eq_ignore_ascii_case("LGUI") {
        "LWin".to_string()
    } else if raw.eq_ignore_ascii_case("RGUI") {
        "RWin".to_string()
    } else {
        raw.to_string()
    }
}

/// Resolve a textual key name to an `rdev::Key`, case-insensitively.
/// Accepts single characters ("h", "5", ","), function keys ("F5") and the
/// usual AutoHotkey-style names ("Enter", "LWin", "PgUp", "NumpadAdd").
/// Returns `None` for names the event layer cannot represent.
pub fn lookup_key(name: &str) -> Option<Key> {
    let key = match name.to_ascii_lowercase().as_str() {
        "a" => Key::KeyA,
        "b" => Key::KeyB,
        "c" => Key::KeyC,
        "d" => Key::KeyD,
        "e" => Key::KeyE,
        "f" => Key::KeyF,
        "g" => Key::KeyG,
        "h" => Key::KeyH,
        "i" => Key::KeyI,
        "j" => Key::KeyJ,
        "k" => Key::KeyK,
        "l" => Key::KeyL,
        "m" => Key::KeyM,
        "n" => Key::KeyN,
        "o" => Key::KeyO,
        "p" => Key::KeyP,
        "q" => Key::KeyQ,
        "r" => Key::KeyR,
        "s" => Key::KeyS,
        "t" => Key::KeyT,
        "u" => Key::KeyU,
        "v" => Key::KeyV,
        "w" => Key::KeyW,
        "x" => Key::KeyX,
        "y" => Key::KeyY,
        "z" => Key::KeyZ,

        "0" => Key::Num0,
        "1" => Key::Num1,
        "2" => Key::Num2,
        "3" => Key::Num3,
        "4" => Key::Num4,
        "5" => Key::Num5,
        "6" => Key::Num6,
        "7" => Key::Num7,
        "8" => Key::Num8,
        "9" => Key::Num9,

        "f1" => Key::F1,
        "f2" => Key::F2,
        "f3" => Key::F3,
        "f4" => Key::F4,
        "f5" => Key::F5,
        "f6" => Key::F6,
        "f7" => Key::F7,
        "f8" => Key::F8,
        "f9" => Key::F9,
        "f10" => Key::F10,
        "f11" => Key::F11,
        "f12" => Key::F12,

        "enter" | "return" => Key::Return,
        "escape" | "esc" => Key::Escape,
        "space" => Key::Space,
        "tab" => Key::Tab,
        "backspace" | "bs" => Key::Backspace,
        "delete" | "del" => Key::Delete,
        "insert" | "ins" => Key::Insert,
        "home" => Key::Home,
        "end" => Key::End,
        "pgup" | "pageup" => Key::PageUp,
        "pgdn" | "pagedown" => Key::PageDown,
        "up" => Key::UpArrow,
        "down" => Key::DownArrow,
        "left" => Key::LeftArrow,
        "right" => Key::RightArrow,

        // Unsided modifier names map to the left-hand key
        "shift" | "lshift" => Key::ShiftLeft,
        "rshift" => Key::ShiftRight,
        "ctrl" | "control" | "lctrl" | "lcontrol" => Key::ControlLeft,
        "rctrl" | "rcontrol" => Key::ControlRight,
        "alt" | "lalt" => Key::Alt,
        "ralt" | "altgr" => Key::AltGr,
        "win" | "lwin" | "lgui" => Key::MetaLeft,
        "rwin" | "rgui" => Key::MetaRight,

        "capslock" => Key::CapsLock,
        "numlock" => Key::NumLock,
        "scrolllock" => Key::ScrollLock,
        "printscreen" => Key::PrintScreen,
        "pause" => Key::Pause,

        "," | "comma" => Key::Comma,
        "." | "period" | "dot" => Key::Dot,
        "/" | "slash" => Key::Slash,
        "\\" | "backslash" => Key::BackSlash,
        ";" | "semicolon" => Key::SemiColon,
        "'" | "quote" => Key::Quote,
        "-" | "minus" => Key::Minus,
        "=" | "equals" | "equal" => Key::Equal,
        "[" | "lbracket" => Key::LeftBracket,
        "]" | "rbracket" => Key::RightBracket,
        "`" | "backquote" | "grave" => Key::BackQuote,

        "numpad0" => Key::Kp0,
        "numpad1" => Key::Kp1,
        "numpad2" => Key::Kp2,
        "numpad3" => Key::Kp3,
        "numpad4" => Key::Kp4,
        "numpad5" => Key::Kp5,
        "numpad6" => Key::Kp6,
        "numpad7" => Key::Kp7,
        "numpad8" => Key::Kp8,
        "numpad9" => Key::Kp9,
        "numpadenter" => Key::KpReturn,
        "numpadadd" => Key::KpPlus,
        "numpadsub" => Key::KpMinus,
        "numpadmult" => Key::KpMultiply,
        "numpaddiv" => Key::KpDivide,
        "numpaddot" | "numpaddel" => Key::KpDelete,

        _ => return None,
    };
    Some(key)
}
