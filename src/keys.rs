use crate::app::{App, Command, InputMode, Modal, View};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

const DETAIL_SCROLL_PAGE: u16 = 10;

pub fn handle_key(app: &mut App, key: KeyEvent) {
    // Ctrl+C always quits
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    // Alerts swallow the next key
    if app.alert.is_some() {
        app.dispatch(Command::DismissAlert);
        return;
    }

    if app.pending_delete.is_some() {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => app.dispatch(Command::ConfirmDelete),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                app.dispatch(Command::CancelDelete)
            }
            _ => {}
        }
        return;
    }

    if key.code == KeyCode::Char('?') && app.input_mode == InputMode::Normal {
        app.show_help = !app.show_help;
        return;
    }

    // If help is showing, any key closes it
    if app.show_help {
        app.show_help = false;
        return;
    }

    match app.input_mode {
        InputMode::Search => handle_search_input(app, key),
        InputMode::Form => handle_form_input(app, key),
        InputMode::Normal => match app.modal {
            Some(Modal::Detail(_)) => handle_detail_key(app, key),
            // The edit modal is only reachable in form mode
            Some(Modal::Edit(_)) => app.input_mode = InputMode::Form,
            None => handle_view_key(app, key),
        },
    }
}

fn handle_search_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
            app.dispatch(Command::Search(String::new()));
        }
        KeyCode::Backspace => {
            let mut query = app.query.clone();
            query.pop();
            app.dispatch(Command::Search(query));
        }
        KeyCode::Char(c) => {
            let query = format!("{}{}", app.query, c);
            app.dispatch(Command::Search(query));
        }
        _ => {}
    }
}

fn handle_form_input(app: &mut App, key: KeyEvent) {
    let editing = app.editing();
    if key.code == KeyCode::Char('s') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.dispatch(if editing { Command::SubmitEdit } else { Command::SubmitAdd });
        return;
    }

    match key.code {
        KeyCode::Esc => {
            if editing {
                app.dispatch(Command::CloseModal);
            } else {
                app.input_mode = InputMode::Normal;
            }
        }
        KeyCode::Tab | KeyCode::Down => app.active_form_mut().focus_next(),
        KeyCode::BackTab | KeyCode::Up => app.active_form_mut().focus_prev(),
        KeyCode::Enter => app.active_form_mut().enter(),
        KeyCode::Backspace => app.active_form_mut().backspace(),
        KeyCode::Char(c) => app.active_form_mut().insert_char(c),
        _ => {}
    }
}

fn handle_detail_key(app: &mut App, key: KeyEvent) {
    let Some(detail) = app.detail_mut() else {
        return;
    };
    let actions = detail.actions;
    let id = detail.recipe.id.clone();

    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => app.dispatch(Command::CloseModal),
        KeyCode::Down | KeyCode::Char('j') => {
            detail.scroll = detail.scroll.saturating_add(1);
        }
        KeyCode::Up | KeyCode::Char('k') => {
            detail.scroll = detail.scroll.saturating_sub(1);
        }
        KeyCode::PageDown => {
            detail.scroll = detail.scroll.saturating_add(DETAIL_SCROLL_PAGE);
        }
        KeyCode::PageUp => {
            detail.scroll = detail.scroll.saturating_sub(DETAIL_SCROLL_PAGE);
        }
        KeyCode::Char('f') if actions.favorite => app.dispatch(Command::Favorite(id)),
        KeyCode::Char('e') if actions.edit => app.dispatch(Command::Edit(id)),
        KeyCode::Char('d') if actions.delete => app.dispatch(Command::Delete(id)),
        _ => {}
    }
}

fn handle_view_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => {
            app.should_quit = true;
            return;
        }
        KeyCode::Char('1') => return app.dispatch(Command::SwitchView(View::Explore)),
        KeyCode::Char('2') => return app.dispatch(Command::SwitchView(View::MyRecipes)),
        KeyCode::Char('3') => return app.dispatch(Command::SwitchView(View::AddRecipe)),
        KeyCode::Tab => return app.dispatch(Command::SwitchView(app.view.next())),
        KeyCode::BackTab => return app.dispatch(Command::SwitchView(app.view.prev())),
        _ => {}
    }

    if app.view == View::AddRecipe {
        if matches!(key.code, KeyCode::Enter | KeyCode::Char('i')) {
            app.input_mode = InputMode::Form;
        }
        return;
    }

    match key.code {
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
        KeyCode::Enter => {
            if let Some(recipe) = app.selected_recipe() {
                let id = recipe.id.clone();
                app.dispatch(Command::OpenDetail(id));
            }
        }
        KeyCode::Char('/') => {
            app.input_mode = InputMode::Search;
        }
        KeyCode::Char('r') => app.refresh(),
        KeyCode::Left | KeyCode::Char('h') if app.show_category_bar() => step_category(app, -1),
        KeyCode::Right | KeyCode::Char('l') if app.show_category_bar() => step_category(app, 1),
        KeyCode::Esc => {
            if !app.query.is_empty() {
                app.dispatch(Command::Search(String::new()));
            }
        }
        _ => {}
    }
}

/// Move the active category button left or right, wrapping around.
fn step_category(app: &mut App, delta: isize) {
    let tokens: Vec<String> = app
        .category_buttons()
        .iter()
        .map(|b| b.token.to_string())
        .collect();
    let current = tokens
        .iter()
        .position(|t| *t == app.active_category)
        .unwrap_or(0);
    let len = tokens.len() as isize;
    let next = (current as isize + delta).rem_euclid(len) as usize;
    if let Some(token) = tokens.into_iter().nth(next) {
        app.dispatch(Command::SelectCategory(token));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{ALL_CATEGORIES, DetailActions};
    use crate::fake_api::{FakeApi, recipe};
    use crate::recipe::RecipeId;
    use std::sync::Arc;

    fn press(app: &mut App, code: KeyCode) {
        handle_key(app, KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn ctrl(app: &mut App, c: char) {
        handle_key(app, KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL));
    }

    fn type_str(app: &mut App, s: &str) {
        for c in s.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    async fn loaded(api: &Arc<FakeApi>) -> App {
        let mut app = App::new(api.clone(), 12);
        app.init();
        app.settle().await;
        api.clear_calls();
        app
    }

    #[tokio::test]
    async fn test_number_keys_switch_views() {
        let api = Arc::new(FakeApi::default());
        let mut app = loaded(&api).await;

        press(&mut app, KeyCode::Char('2'));
        assert_eq!(app.view, View::MyRecipes);
        press(&mut app, KeyCode::Char('3'));
        assert_eq!(app.view, View::AddRecipe);
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.view, View::Explore);
        press(&mut app, KeyCode::BackTab);
        assert_eq!(app.view, View::AddRecipe);
        app.settle().await;
        let mut calls = api.calls();
        calls.sort();
        assert_eq!(calls, vec!["GET /my-recipes", "GET /recipes/random/12"]);
    }

    #[tokio::test]
    async fn test_search_typing_filters() {
        let api = Arc::new(FakeApi::default());
        api.set_random(vec![recipe("1", "Chicken Curry"), recipe("2", "Beef Stew")]);
        let mut app = loaded(&api).await;

        press(&mut app, KeyCode::Char('/'));
        assert_eq!(app.input_mode, InputMode::Search);
        type_str(&mut app, "stew");
        assert_eq!(app.query, "stew");
        assert_eq!(app.visible, vec![1]);

        // 'q' is text while searching
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.should_quit);
        press(&mut app, KeyCode::Backspace);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(app.visible, vec![1]);

        press(&mut app, KeyCode::Esc);
        assert!(app.query.is_empty());
        assert_eq!(app.visible.len(), 2);
    }

    #[tokio::test]
    async fn test_arrows_cycle_categories() {
        let api = Arc::new(FakeApi::default());
        api.set_categories(&["Beef", "Chicken"]);
        let mut app = loaded(&api).await;

        press(&mut app, KeyCode::Right);
        assert_eq!(app.active_category, "Beef");
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Right);
        assert_eq!(app.active_category, ALL_CATEGORIES);
        press(&mut app, KeyCode::Left);
        assert_eq!(app.active_category, "Chicken");
        app.settle().await;
        assert_eq!(api.calls().len(), 4);

        // No category bar outside explore
        press(&mut app, KeyCode::Char('2'));
        press(&mut app, KeyCode::Right);
        assert_eq!(app.active_category, "Chicken");
    }

    #[tokio::test]
    async fn test_detail_keys_respect_visible_actions() {
        let api = Arc::new(FakeApi::default());
        api.set_mine(vec![recipe("local-1", "Tortilla")]);
        let mut app = loaded(&api).await;
        press(&mut app, KeyCode::Char('2'));
        app.settle().await;
        press(&mut app, KeyCode::Enter);
        let actions = app.detail().map(|d| d.actions);
        assert_eq!(actions, Some(DetailActions { favorite: false, edit: true, delete: true }));

        // Favorite is hidden here
        api.clear_calls();
        press(&mut app, KeyCode::Char('f'));
        assert_eq!(app.in_flight(), 0);
        assert!(app.alert.is_none());

        press(&mut app, KeyCode::Char('d'));
        assert_eq!(app.pending_delete, Some(RecipeId::new("local-1")));
        press(&mut app, KeyCode::Char('x'));
        assert!(app.pending_delete.is_some());
        press(&mut app, KeyCode::Char('n'));
        assert!(app.pending_delete.is_none());

        press(&mut app, KeyCode::Char('e'));
        assert!(app.editing());
        assert_eq!(app.input_mode, InputMode::Form);
        press(&mut app, KeyCode::Esc);
        assert!(app.modal.is_none());
        assert_eq!(app.input_mode, InputMode::Normal);
    }

    #[tokio::test]
    async fn test_alert_swallows_next_key() {
        let api = Arc::new(FakeApi::default());
        let mut app = loaded(&api).await;
        app.alert = Some("Saved".to_string());
        press(&mut app, KeyCode::Char('q'));
        assert!(app.alert.is_none());
        assert!(!app.should_quit);
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn test_add_form_typing_and_submit() {
        let api = Arc::new(FakeApi::default());
        let mut app = loaded(&api).await;
        press(&mut app, KeyCode::Char('3'));
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.input_mode, InputMode::Form);

        type_str(&mut app, "Pancakes");
        press(&mut app, KeyCode::Enter);
        type_str(&mut app, "Breakfast");
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Tab);
        type_str(&mut app, "Mix");
        press(&mut app, KeyCode::Tab);
        type_str(&mut app, "2 eggs");
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Enter);
        type_str(&mut app, "1 cup flour");

        ctrl(&mut app, 's');
        app.settle().await;
        let sent = api.drafts();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].1.name, "Pancakes");
        assert_eq!(sent[0].1.category, "Breakfast");
        assert_eq!(sent[0].1.instructions, "Mix");
        assert_eq!(sent[0].1.ingredients, "2 eggs\n1 cup flour");

        press(&mut app, KeyCode::Char('x'));
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.input_mode, InputMode::Normal);
    }

    #[tokio::test]
    async fn test_enter_ignored_while_grid_is_loading() {
        let api = Arc::new(FakeApi::default());
        api.set_random(vec![recipe("52772", "Teriyaki")]);
        api.set_detail(recipe("52772", "Teriyaki"));
        let mut app = loaded(&api).await;

        press(&mut app, KeyCode::Char('2'));
        press(&mut app, KeyCode::Enter);
        app.settle().await;
        assert!(app.modal.is_none());
        assert_eq!(api.calls(), vec!["GET /my-recipes"]);
    }

    #[tokio::test]
    async fn test_ctrl_c_quits_from_any_mode() {
        let api = Arc::new(FakeApi::default());
        let mut app = loaded(&api).await;
        press(&mut app, KeyCode::Char('/'));
        ctrl(&mut app, 'c');
        assert!(app.should_quit);
    }
}
