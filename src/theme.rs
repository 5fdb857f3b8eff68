use ratatui::style::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeMode {
    Dark,
    Light,
}

impl ThemeMode {
    pub fn from_name(name: &str) -> Self {
        if name.trim().eq_ignore_ascii_case("light") {
            ThemeMode::Light
        } else {
            ThemeMode::Dark
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            ThemeMode::Dark => ThemeMode::Light,
            ThemeMode::Light => ThemeMode::Dark,
        }
    }

    pub fn palette(self) -> Palette {
        match self {
            ThemeMode::Dark => Palette::DARK,
            ThemeMode::Light => Palette::LIGHT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub bg: Color,
    pub surface: Color,
    pub surface_focused: Color,
    pub selected: Color,
    pub border: Color,
    pub border_focused: Color,
    pub text: Color,
    pub muted: Color,
    pub brand: Color,
    pub success: Color,
    pub error: Color,
    pub backdrop: Color,
}

impl Palette {
    pub const DARK: Palette = Palette {
        bg: Color::Rgb(30, 30, 46),
        surface: Color::Rgb(24, 24, 36),
        surface_focused: Color::Rgb(49, 50, 68),
        selected: Color::Rgb(69, 71, 90),
        border: Color::Rgb(49, 50, 68),
        border_focused: Color::Rgb(137, 180, 250),
        text: Color::Rgb(205, 214, 244),
        muted: Color::Rgb(166, 173, 200),
        brand: Color::Rgb(137, 180, 250),
        success: Color::Rgb(166, 227, 161),
        error: Color::Rgb(243, 139, 168),
        backdrop: Color::Rgb(17, 17, 27),
    };

    pub const LIGHT: Palette = Palette {
        bg: Color::Rgb(239, 241, 245),
        surface: Color::Rgb(230, 233, 239),
        surface_focused: Color::Rgb(220, 224, 232),
        selected: Color::Rgb(204, 208, 218),
        border: Color::Rgb(188, 192, 204),
        border_focused: Color::Rgb(30, 102, 245),
        text: Color::Rgb(76, 79, 105),
        muted: Color::Rgb(108, 111, 133),
        brand: Color::Rgb(30, 102, 245),
        success: Color::Rgb(64, 160, 43),
        error: Color::Rgb(210, 15, 57),
        backdrop: Color::Rgb(204, 208, 218),
    };
}

pub fn tag_color(tag: &str) -> Color {
    match tag {
        "Rust" | "Laravel" | "NPM Package" => Color::Rgb(243, 139, 168),
        "React" | "MySQL" | "Frontend Development" | "Azure" | "Algorithms" => {
            Color::Rgb(137, 180, 250)
        }
        "CSS" | "CSS3" | "Tailwind" | "FastAPI" => Color::Rgb(148, 226, 213),
        "HTML" | "AWS" | "Hugging Face" | "Visualization" => Color::Rgb(250, 179, 135),
        "JavaScript" | "TypeScript" | "QA" | "Design System" | "D3" => Color::Rgb(249, 226, 175),
        "PHP" | "UI/UX Design" | "Stripe" | "Terraform" | "DSA" | "Chatbot" => {
            Color::Rgb(203, 166, 247)
        }
        "Figma" | "Storybook" => Color::Rgb(245, 194, 231),
        "Web Development" | "Realtime" | "MongoDB" | "PostgreSQL" => Color::Rgb(166, 227, 161),
        "Go" | "Beginner" | "Beginner Project" | "Observability" => Color::Rgb(137, 220, 235),
        "IaC" | "Material-UI" | "CLI" => Color::Rgb(180, 190, 254),
        "GCP" => Color::Rgb(235, 160, 172),
        "Full Stack" | "AI & ML" | "ML" | "AI" => Color::Rgb(242, 205, 205),
        _ => Color::Rgb(147, 153, 178),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theme_names_fall_back_to_dark() {
        assert_eq!(ThemeMode::from_name("Light"), ThemeMode::Light);
        assert_eq!(ThemeMode::from_name("dracula"), ThemeMode::Dark);
        assert_eq!(ThemeMode::Dark.toggled(), ThemeMode::Light);
    }

    #[test]
    fn unknown_tags_are_grey() {
        assert_eq!(tag_color("Some New Thing"), Color::Rgb(147, 153, 178));
        assert_ne!(tag_color("Rust"), tag_color("Some New Thing"));
    }
}
