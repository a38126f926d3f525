/// Built-in glyph sets. Order inside a preset does not matter: calibration sorts it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Preset {
    Detailed,
    #[default]
    Standard,
    Blocks,
    Binary,
    Minimal,
}

impl Preset {
    pub const ALL: [Preset; 5] =
        [Preset::Detailed, Preset::Standard, Preset::Blocks, Preset::Binary, Preset::Minimal];

    pub fn chars(self) -> &'static str {
        match self {
            Preset::Detailed => {
                "$@B%8&WM#*oahkbdpqwmZO0QLCJUYXzcvunxrjft/\\|()1{}[]?-_+~<>i!lI;:,\"^`'. "
            },
            Preset::Standard => "@%#*+=-:. ",
            Preset::Blocks => "█▓▒░ ",
            Preset::Binary => "01",
            Preset::Minimal => "#+. ",
        }
    }
}
