use crate::recipe::{Recipe, RecipeDraft};

/// Field of the add/edit recipe form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormField {
    #[default]
    Name,
    Category,
    ImageUrl,
    Instructions,
    Ingredients,
}

impl FormField {
    pub const ALL: [FormField; 5] = [
        Self::Name,
        Self::Category,
        Self::ImageUrl,
        Self::Instructions,
        Self::Ingredients,
    ];

    pub fn next(self) -> Self {
        match self {
            Self::Name => Self::Category,
            Self::Category => Self::ImageUrl,
            Self::ImageUrl => Self::Instructions,
            Self::Instructions => Self::Ingredients,
            Self::Ingredients => Self::Name,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Self::Name => Self::Ingredients,
            Self::Category => Self::Name,
            Self::ImageUrl => Self::Category,
            Self::Instructions => Self::ImageUrl,
            Self::Ingredients => Self::Instructions,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::Category => "Category",
            Self::ImageUrl => "Image URL",
            Self::Instructions => "Instructions",
            Self::Ingredients => "Ingredients (one per line)",
        }
    }

    /// Multi-line fields take Enter as a newline.
    pub fn multiline(self) -> bool {
        matches!(self, Self::Instructions | Self::Ingredients)
    }
}

/// Editing state of a recipe form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeForm {
    pub name: String,
    pub category: String,
    pub image_url: String,
    pub instructions: String,
    pub ingredients: String,
    pub focus: FormField,
}

impl RecipeForm {
    /// Form prefilled from an existing recipe.
    pub fn from_recipe(recipe: &Recipe) -> Self {
        Self {
            name: recipe.name.clone(),
            category: recipe.category.clone(),
            image_url: recipe.image_url.clone(),
            instructions: recipe.instructions.clone(),
            ingredients: recipe.ingredients_text(),
            focus: FormField::Name,
        }
    }

    pub fn value(&self, field: FormField) -> &str {
        match field {
            FormField::Name => &self.name,
            FormField::Category => &self.category,
            FormField::ImageUrl => &self.image_url,
            FormField::Instructions => &self.instructions,
            FormField::Ingredients => &self.ingredients,
        }
    }

    fn focused_mut(&mut self) -> &mut String {
        match self.focus {
            FormField::Name => &mut self.name,
            FormField::Category => &mut self.category,
            FormField::ImageUrl => &mut self.image_url,
            FormField::Instructions => &mut self.instructions,
            FormField::Ingredients => &mut self.ingredients,
        }
    }

    pub fn insert_char(&mut self, c: char) {
        self.focused_mut().push(c);
    }

    pub fn backspace(&mut self) {
        self.focused_mut().pop();
    }

    /// Enter: newline in multi-line fields, next field otherwise.
    pub fn enter(&mut self) {
        if self.focus.multiline() {
            self.focused_mut().push('\n');
        } else {
            self.focus_next();
        }
    }

    pub fn focus_next(&mut self) {
        self.focus = self.focus.next();
    }

    pub fn focus_prev(&mut self) {
        self.focus = self.focus.prev();
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Payload for the backend.
    pub fn to_draft(&self) -> RecipeDraft {
        RecipeDraft {
            name: self.name.clone(),
            category: self.category.clone(),
            image_url: self.image_url.clone(),
            instructions: self.instructions.clone(),
            ingredients: normalize_ingredients(&self.ingredients),
        }
    }
}

/// Drop blank lines and re-join with `\n`. Non-blank lines are kept as typed.
pub fn normalize_ingredients(text: &str) -> String {
    text.split('\n')
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
