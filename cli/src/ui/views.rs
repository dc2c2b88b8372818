use super::app::{App, Entry, Landing, Screen};
use super::customer::{
    CustomerFlow, DispenseStep, LoginField, LoginStep, MaxLiters, SelectField, SelectStep, Stage,
};
use super::form::TextField;
use super::owner::{OwnerDashboard, OwnerFocus};
use crate::api::Receipt;
use crate::fuel::{format_sar, price_banner, Grade};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

const ACCENT: Color = Color::Yellow;

pub fn draw(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Main content
            Constraint::Length(3), // Status bar
        ])
        .split(f.area());

    draw_header(f, app, chunks[0]);
    match &mut app.screen {
        Screen::Home(landing) => draw_home(f, landing, chunks[1]),
        Screen::Owner(dashboard) => draw_owner(f, dashboard, chunks[1]),
        Screen::Customer(flow) => draw_customer(f, flow, chunks[1]),
    }
    draw_status_bar(f, app, chunks[2]);

    if let Some(message) = &app.alert {
        draw_alert(f, message);
    }
}

fn draw_header(f: &mut Frame, app: &App, area: Rect) {
    let section = match &app.screen {
        Screen::Home(_) => "Home",
        Screen::Owner(_) => Entry::Owner.title(),
        Screen::Customer(_) => Entry::Customer.title(),
    };
    let line = Line::from(vec![
        Span::styled(" ⛽ FuelCredit ", Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)),
        Span::styled("│ ", Style::default().fg(Color::DarkGray)),
        Span::styled(section, Style::default().fg(Color::White)),
    ]);
    let header = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
    f.render_widget(header, area);
}

// Landing

fn draw_home(f: &mut Frame, landing: &Landing, area: Rect) {
    let button = |entry: Entry| {
        let style = if landing.selected == entry {
            Style::default().fg(Color::Black).bg(ACCENT).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        Span::styled(format!("  {}  ", entry.title()), style)
    };

    let text = vec![
        Line::from(""),
        Line::from(Span::styled(
            "PREMIUM FUEL CREDIT PLATFORM",
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Elevate your station with a luxury, credit-powered fueling experience",
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Load credit for customers, authorize pumps by ID, and see transactions reflect in real time.",
            Style::default().fg(Color::Gray),
        )),
        Line::from(""),
        Line::from(""),
        Line::from(vec![button(Entry::Owner), Span::raw("    "), button(Entry::Customer)]),
    ];

    let body = Paragraph::new(text)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(ACCENT)),
        );
    f.render_widget(body, area);
}

// Owner

fn draw_owner(f: &mut Frame, dashboard: &mut OwnerDashboard, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(62), Constraint::Percentage(38)])
        .split(area);

    draw_customer_list(f, dashboard, columns[0]);

    let side = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(11), Constraint::Min(0)])
        .split(columns[1]);
    draw_create_form(f, dashboard, side[0]);
    draw_top_up(f, dashboard, side[1]);
}

fn pad(text: &str, width: usize) -> String {
    let used = text.width();
    if used >= width {
        text.to_string()
    } else {
        format!("{}{}", text, " ".repeat(width - used))
    }
}

fn draw_customer_list(f: &mut Frame, dashboard: &mut OwnerDashboard, area: Rect) {
    let selected_id = dashboard.selected_customer().map(|c| c.id.clone());

    let items: Vec<ListItem> = if dashboard.customers.is_empty() {
        let hint = if dashboard.is_refreshing() {
            "  Loading customers..."
        } else {
            "  No customers yet. Add one with the form on the right."
        };
        vec![ListItem::new(Line::from(Span::styled(hint, Style::default().fg(Color::DarkGray))))]
    } else {
        dashboard
            .customers
            .iter()
            .map(|c| {
                let marker = if selected_id.as_deref() == Some(c.id.as_str()) {
                    "★ "
                } else {
                    "  "
                };
                ListItem::new(Line::from(vec![
                    Span::styled(marker, Style::default().fg(ACCENT)),
                    Span::styled(
                        pad(&c.name, 22),
                        Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(pad(&c.phone, 16), Style::default().fg(Color::Gray)),
                    Span::styled(format_sar(c.balance()), Style::default().fg(ACCENT)),
                ]))
            })
            .collect()
    };

    let focused = dashboard.focus == OwnerFocus::Customers;
    let title = format!(
        " Customers ({}) · Prices — {} ",
        dashboard.customers.len(),
        price_banner()
    );
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border(focused))
                .title(title),
        )
        .highlight_style(if focused {
            Style::default().bg(Color::Blue).fg(Color::White).add_modifier(Modifier::BOLD)
        } else {
            Style::default().add_modifier(Modifier::BOLD)
        })
        .highlight_symbol("▶ ");

    f.render_stateful_widget(list, area, &mut dashboard.list_state);
}

fn draw_create_form(f: &mut Frame, dashboard: &OwnerDashboard, area: Rect) {
    let focused = dashboard.focus.is_create_form();
    let button = if dashboard.is_loading() {
        "Please wait..."
    } else {
        "Create"
    };

    let lines = vec![
        field_line("Name", &dashboard.form.name, "Full name", dashboard.focus == OwnerFocus::Name),
        field_line("Phone", &dashboard.form.phone, "Phone", dashboard.focus == OwnerFocus::Phone),
        field_line("Email", &dashboard.form.email, "optional", dashboard.focus == OwnerFocus::Email),
        field_line("PIN", &dashboard.form.pin, "4-8 digits", dashboard.focus == OwnerFocus::Pin),
        Line::from(""),
        button_line(button, focused),
    ];

    let form = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border(focused))
            .title(" Add Customer "),
    );
    f.render_widget(form, area);
}

fn draw_top_up(f: &mut Frame, dashboard: &OwnerDashboard, area: Rect) {
    let focused = dashboard.focus == OwnerFocus::Amount;
    let target = match dashboard.selected_customer() {
        Some(c) => Line::from(vec![
            Span::styled("Selected: ", Style::default().fg(Color::Gray)),
            Span::styled(c.name.clone(), Style::default().fg(Color::White).add_modifier(Modifier::BOLD)),
            Span::styled(format!("  {}", format_sar(c.balance())), Style::default().fg(ACCENT)),
        ]),
        None => Line::from(Span::styled(
            "Select a customer from the list",
            Style::default().fg(Color::DarkGray),
        )),
    };
    let button = if dashboard.is_loading() {
        "Please wait..."
    } else {
        "Add Credit"
    };

    let lines = vec![
        target,
        Line::from(""),
        field_line("Amount", &dashboard.amount, "SAR", focused),
        Line::from(""),
        button_line(button, focused && dashboard.selected_customer().is_some()),
    ];

    let panel = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border(focused))
            .title(" Load Credit "),
    );
    f.render_widget(panel, area);
}

// Customer

fn draw_customer(f: &mut Frame, flow: &CustomerFlow, area: Rect) {
    let width = area.width.min(64);
    let column = Rect {
        x: area.x + (area.width - width) / 2,
        width,
        ..area
    };
    let busy = flow.is_busy();

    match flow.stage() {
        Stage::Login(step) => draw_login(f, step, busy, column),
        Stage::Select(step) => draw_select(f, step, busy, column),
        Stage::Dispense(step) => draw_dispense(f, step, busy, column),
        Stage::Done(receipt) => draw_receipt(f, receipt, column),
    }
}

fn draw_login(f: &mut Frame, step: &LoginStep, busy: bool, area: Rect) {
    let lines = vec![
        Line::from(Span::styled(
            "Secure login with your phone and PIN",
            Style::default().fg(Color::Gray),
        )),
        Line::from(""),
        field_line("Phone", &step.phone, "Phone", step.focus == LoginField::Phone),
        field_line("PIN", &step.pin, "PIN", step.focus == LoginField::Pin),
        Line::from(""),
        button_line(if busy { "Signing in..." } else { "Continue" }, true),
    ];
    let card = Paragraph::new(lines).block(card_block(" Sign In "));
    f.render_widget(card, area);
}

fn draw_select(f: &mut Frame, step: &SelectStep, busy: bool, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Welcome
            Constraint::Length(6), // Grades
            Constraint::Length(7), // Pump & liters
            Constraint::Min(0),
        ])
        .split(area);

    let welcome = Paragraph::new(vec![
        Line::from(vec![
            Span::styled("Welcome ", Style::default().fg(Color::Gray)),
            Span::styled(step.user.name.clone(), Style::default().fg(Color::White).add_modifier(Modifier::BOLD)),
        ]),
        Line::from(vec![
            Span::styled("Balance ", Style::default().fg(Color::Gray)),
            Span::styled(
                format_sar(step.user.balance),
                Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
            ),
        ]),
    ])
    .block(card_block(" Account "));
    f.render_widget(welcome, rows[0]);

    let grades: Vec<Span> = Grade::ALL
        .iter()
        .flat_map(|g| {
            let style = if *g == step.grade {
                Style::default().fg(Color::Black).bg(ACCENT).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            [
                Span::styled(format!(" {} {} / L ", g.code(), g.unit_price()), style),
                Span::raw("  "),
            ]
        })
        .collect();
    let max = match step.max_liters {
        MaxLiters::Loading => "…".to_string(),
        MaxLiters::Known(max) => max.to_string(),
        MaxLiters::Unavailable => "n/a".to_string(),
    };
    let fuel = Paragraph::new(vec![
        Line::from(grades),
        Line::from(""),
        Line::from(vec![
            Span::styled("Max liters: ", Style::default().fg(Color::Gray)),
            Span::styled(max.clone(), Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)),
        ]),
    ])
    .block(card_block(" Select Fuel  ←/→ "));
    f.render_widget(fuel, rows[1]);

    let pump = Paragraph::new(vec![
        field_line("Pump ID", &step.pump_id, "Pump ID", step.focus == SelectField::PumpId),
        field_line(
            "Liters",
            &step.liters,
            &format!("<= {max}"),
            step.focus == SelectField::Liters,
        ),
        Line::from(""),
        button_line(if busy { "Starting..." } else { "Start Session" }, true),
    ])
    .block(card_block(" Pump & Liters "));
    f.render_widget(pump, rows[2]);
}

fn draw_dispense(f: &mut Frame, step: &DispenseStep, busy: bool, area: Rect) {
    let session = &step.session;
    let lines = vec![
        Line::from(vec![
            Span::styled(step.user.name.clone(), Style::default().fg(Color::White).add_modifier(Modifier::BOLD)),
            Span::styled("  Balance ", Style::default().fg(Color::Gray)),
            Span::styled(format_sar(step.user.balance), Style::default().fg(ACCENT)),
        ]),
        Line::from(""),
        Line::from(Span::styled("Session Token", Style::default().fg(Color::Gray))),
        Line::from(Span::styled(
            session.token.as_str().to_string(),
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("Confirm to begin fueling."),
        Line::from(Span::styled(
            format!(
                "Grade {} • Liters {} • Est. {}",
                session.grade,
                session.liters,
                format_sar(session.estimated_total())
            ),
            Style::default().fg(Color::Gray),
        )),
        Line::from(""),
        button_line(if busy { "Confirming..." } else { "Confirm Dispense" }, true),
    ];
    let card = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(card_block(" Dispense "));
    f.render_widget(card, area);
}

fn draw_receipt(f: &mut Frame, receipt: &Receipt, area: Rect) {
    let label = Style::default().fg(Color::Gray);
    let lines = vec![
        Line::from(Span::styled(
            receipt.receipt_no.clone(),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(vec![Span::styled("Grade: ", label), Span::raw(receipt.grade.clone())]),
        Line::from(vec![Span::styled("Liters: ", label), Span::raw(receipt.liters.to_string())]),
        Line::from(vec![Span::styled("Total: ", label), Span::raw(format!("{} SAR", receipt.total))]),
        Line::from(vec![
            Span::styled("New Balance: ", label),
            Span::styled(
                format!("{} SAR", receipt.new_balance),
                Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(""),
        button_line("Back Home", true),
    ];
    let card = Paragraph::new(lines).block(card_block(" Receipt "));
    f.render_widget(card, area);
}

// Shared pieces

fn border(focused: bool) -> Style {
    Style::default().fg(if focused { ACCENT } else { Color::DarkGray })
}

fn card_block(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(ACCENT))
        .title(title)
}

fn field_line(label: &str, field: &TextField, hint: &str, focused: bool) -> Line<'static> {
    let (label_style, input_style) = if focused {
        (
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        )
    } else {
        (Style::default().fg(Color::DarkGray), Style::default().fg(Color::Gray))
    };

    let cursor = if focused { "█" } else { "" };
    let value = if field.is_empty() && !focused {
        format!("({hint})")
    } else {
        format!("{}{}", field.display(), cursor)
    };
    let indicator = if focused { "▶ " } else { "  " };

    Line::from(vec![
        Span::styled(indicator, label_style),
        Span::styled(format!("{label}: "), label_style),
        Span::styled(value, input_style),
    ])
}

fn button_line(text: &str, active: bool) -> Line<'static> {
    let style = if active {
        Style::default().fg(Color::Black).bg(ACCENT).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    Line::from(Span::styled(format!("[ {text} ]"), style))
}

fn draw_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let help_text = if app.alert.is_some() {
        " Enter/Esc:Dismiss  Ctrl+C:Quit ".to_string()
    } else {
        match &app.screen {
            Screen::Home(_) => " ←/→:Choose  Enter:Open  1:Owner  2:Customer  q:Quit ".to_string(),
            Screen::Owner(d) if d.focus == OwnerFocus::Customers => {
                " ↑/↓:Select  Enter:Pick  r:Refresh  Tab:Forms  Esc:Home ".to_string()
            }
            Screen::Owner(_) => " Tab/↑/↓:Fields  Enter:Submit  Esc:Home ".to_string(),
            Screen::Customer(flow) => match flow.stage() {
                Stage::Login(_) => " Tab:Field  Enter:Continue  Esc:Home ".to_string(),
                Stage::Select(_) => " ←/→:Grade  Tab:Field  Enter:Start Session  Esc:Home ".to_string(),
                Stage::Dispense(_) => " Enter:Confirm Dispense  Esc:Home ".to_string(),
                Stage::Done(_) => " Enter:Back Home ".to_string(),
            },
        }
    };

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(area);

    let help = Paragraph::new(Line::from(Span::styled(help_text, Style::default().fg(Color::Cyan))))
        .block(Block::default().borders(Borders::ALL).title(" Keys "));

    let info = match &app.screen {
        Screen::Owner(d) => match d.last_refreshed {
            Some(at) => format!(" refreshed {} ", at.format("%H:%M:%S")),
            None => " not loaded yet ".to_string(),
        },
        _ => format!(" {} ", app.client.base_url()),
    };
    let info_widget = Paragraph::new(Line::from(Span::styled(info, Style::default().fg(Color::DarkGray))))
        .block(Block::default().borders(Borders::ALL).title(" Info "));

    f.render_widget(help, chunks[0]);
    f.render_widget(info_widget, chunks[1]);
}

fn draw_alert(f: &mut Frame, message: &str) {
    let area = centered_rect(50, 7, f.area());
    let text = vec![
        Line::from(Span::styled(message.to_string(), Style::default().fg(Color::White))),
        Line::from(""),
        Line::from(Span::styled("Enter to dismiss", Style::default().fg(Color::DarkGray))),
    ];
    let popup = Paragraph::new(text)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red))
                .title(" Alert "),
        );
    f.render_widget(Clear, area);
    f.render_widget(popup, area);
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{FuelClient, SessionToken, SessionUser};
    use crate::config::Config;
    use crate::ui::customer::CustomerReply;
    use ratatui::{backend::TestBackend, buffer::Buffer, Terminal};
    use std::time::Duration;

    fn app_with(screen: Screen) -> App {
        let config = Config::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap();
        let mut app = App::new(FuelClient::new(&config).unwrap());
        app.screen = screen;
        app
    }

    fn render(app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 36)).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        buffer_text(terminal.backend().buffer())
    }

    fn buffer_text(buffer: &Buffer) -> String {
        buffer
            .content()
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn logged_in_flow() -> CustomerFlow {
        let mut flow = CustomerFlow::new();
        let login = flow.submit().into_call().unwrap();
        let max = flow
            .apply(
                login.id,
                CustomerReply::LoggedIn(Ok(SessionUser {
                    customer_id: "c1".into(),
                    name: "Ali".into(),
                    balance: 120.5,
                })),
            )
            .into_call()
            .unwrap();
        flow.apply(max.id, CustomerReply::MaxLiters(Ok(40.0)));
        flow
    }

    #[test]
    fn landing_shows_both_entry_points() {
        let screen = render(&mut app_with(Screen::Home(Landing::default())));
        assert!(screen.contains("PREMIUM FUEL CREDIT PLATFORM"));
        assert!(screen.contains("Owner Dashboard"));
        assert!(screen.contains("Customer App"));
    }

    #[test]
    fn select_step_shows_balance_prices_and_max() {
        let screen = render(&mut app_with(Screen::Customer(logged_in_flow())));
        assert!(screen.contains("Ali"));
        assert!(screen.contains("120.50 SAR"));
        assert!(screen.contains("Max liters: 40"));
        for grade in Grade::ALL {
            assert!(screen.contains(&format!("{} {} / L", grade.code(), grade.unit_price())));
        }
    }

    #[test]
    fn dispense_step_shows_token_and_estimate() {
        let mut flow = logged_in_flow();
        flow.toggle_field();
        "10".chars().for_each(|c| flow.handle_char(c));
        let start = flow.submit().into_call().unwrap();
        flow.apply(
            start.id,
            CustomerReply::SessionStarted(SessionToken::try_from("tok-abc".to_string())),
        );

        let screen = render(&mut app_with(Screen::Customer(flow)));
        assert!(screen.contains("Ali  Balance 120.50 SAR"));
        assert!(screen.contains("tok-abc"));
        assert!(screen.contains("Confirm to begin fueling."));
        assert!(screen.contains("Grade G91 • Liters 10 • Est. 21.80 SAR"));
    }

    #[test]
    fn receipt_shows_every_field() {
        let mut flow = logged_in_flow();
        flow.toggle_field();
        "10".chars().for_each(|c| flow.handle_char(c));
        let start = flow.submit().into_call().unwrap();
        flow.apply(
            start.id,
            CustomerReply::SessionStarted(SessionToken::try_from("tok".to_string())),
        );
        let confirm = flow.submit().into_call().unwrap();
        flow.apply(
            confirm.id,
            CustomerReply::Confirmed(Ok(Receipt {
                receipt_no: "R100".into(),
                grade: "G91".into(),
                liters: 10.0,
                total: 21.8,
                new_balance: 98.7,
            })),
        );

        let screen = render(&mut app_with(Screen::Customer(flow)));
        assert!(screen.contains("R100"));
        assert!(screen.contains("Grade: G91"));
        assert!(screen.contains("Liters: 10"));
        assert!(screen.contains("Total: 21.8 SAR"));
        assert!(screen.contains("New Balance: 98.7 SAR"));
    }

    #[test]
    fn login_masks_pin() {
        let mut flow = CustomerFlow::new();
        "0555".chars().for_each(|c| flow.handle_char(c));
        flow.toggle_field();
        "1234".chars().for_each(|c| flow.handle_char(c));

        let screen = render(&mut app_with(Screen::Customer(flow)));
        assert!(screen.contains("0555"));
        assert!(screen.contains("••••"));
        assert!(!screen.contains("1234"));
    }

    #[test]
    fn owner_dashboard_lists_customers_with_prices() {
        let (mut dashboard, action) = OwnerDashboard::open();
        let list = action.into_call().unwrap();
        dashboard.apply(
            list.id,
            crate::ui::owner::OwnerReply::Customers(Ok(vec![crate::api::Customer {
                id: "c1".into(),
                name: "Ali".into(),
                phone: "0555".into(),
                email: None,
                balance: Some(120.5),
            }])),
        );

        let screen = render(&mut app_with(Screen::Owner(dashboard)));
        assert!(screen.contains("Ali"));
        assert!(screen.contains("120.50 SAR"));
        assert!(screen.contains("G91 2.18 • G95 2.33 • Diesel 1.66"));
        assert!(screen.contains("Select a customer from the list"));
    }

    #[test]
    fn alert_is_drawn_over_the_screen() {
        let mut app = app_with(Screen::Customer(CustomerFlow::new()));
        app.alert = Some("Invalid credentials".into());

        let screen = render(&mut app);
        assert!(screen.contains("Invalid credentials"));
        assert!(screen.contains("Enter to dismiss"));
    }
}
