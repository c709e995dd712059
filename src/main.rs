mod prompts;

use std::marker::PhantomData;

use anyhow::Result;
use derive_more::Display;
use hemolife::config::Config;
use hemolife::form::FormModal;
use hemolife::models::*;
use hemolife::search::{self, Query};
use hemolife::services::{BankRecord, BloodBank, View};
use hemolife::store::Record;
use inquire::{Confirm, InquireError, Select, Text};
use log::info;
use prompts::FillDraft;
use strum::IntoEnumIterator;
use strum_macros::EnumIter;

type MenuExit = Option<()>;
const MENU_EXIT: MenuExit = None;
const MENU_LOOP: MenuExit = Some(());

/// A text menu
trait Menu {
    /// Runs the menu once. Returns None when the menu is done,
    /// Some(()) when it must be shown again.
    fn enter(&mut self) -> Result<Option<()>>;

    /// Runs the menu until it is done, reporting errors along the way.
    fn enter_loop(&mut self) {
        while let Some(result) = self.enter().transpose() {
            if let Err(error) = result {
                eprintln!("Error: {error}");
            }
        }
    }
}

pub struct App {
    bank: BloodBank,
    config: Config,
}

impl App {
    pub fn new(bank: BloodBank, config: Config) -> Self {
        App { bank, config }
    }

    pub fn start(&mut self) -> Result<()> {
        println!("Welcome to HemoLife, blood bank administration.");
        self.enter_loop();
        info!("Session closed");
        Ok(())
    }
}

#[derive(Display)]
enum MainChoice {
    #[display("{_0}")]
    Open(View),
    #[display("Quit")]
    Quit,
}

impl Menu for App {
    fn enter(&mut self) -> Result<MenuExit> {
        let choices: Vec<MainChoice> = View::iter()
            .map(MainChoice::Open)
            .chain([MainChoice::Quit])
            .collect();

        let view = match Select::new("Which screen?", choices)
            .with_starting_cursor(self.bank.view() as usize)
            .prompt()?
        {
            MainChoice::Open(view) => view,
            MainChoice::Quit => return Ok(MENU_EXIT),
        };

        self.bank.select_view(view);
        match view {
            View::Dashboard => show_dashboard(&self.bank),
            View::Inventory => RecordMenu::<BloodUnit>::new(&mut self.bank).enter_loop(),
            View::Collection => RecordMenu::<Collection>::new(&mut self.bank).enter_loop(),
            View::Issue => IssueMenu { bank: &mut self.bank }.enter_loop(),
            View::Donors => RecordMenu::<Donor>::new(&mut self.bank).enter_loop(),
            View::Users => RecordMenu::<AppUser>::new(&mut self.bank).enter_loop(),
            View::Assistant => show_assistant(&self.bank, self.config.low_stock_threshold),
        }
        Ok(MENU_LOOP)
    }
}

/// A record kind with its own screen
trait Screen: BankRecord + std::fmt::Display {
    const TITLE: &'static str;

    fn fill(draft: &mut Self::Draft) -> Result<(), InquireError>;

    fn statuses() -> Vec<Self::Status>;
}

macro_rules! screen {
    ($record:ty, $title:literal) => {
        impl Screen for $record {
            const TITLE: &'static str = $title;

            fn fill(draft: &mut Self::Draft) -> Result<(), InquireError> {
                draft.fill()
            }

            fn statuses() -> Vec<Self::Status> {
                <Self as Record>::Status::iter().collect()
            }
        }
    };
}

screen!(BloodUnit, "Blood inventory");
screen!(Donor, "Donors");
screen!(Collection, "Collection history");
screen!(BloodRequest, "Blood requests");
screen!(AppUser, "User management");

fn print_records<'a, T: std::fmt::Display + 'a>(records: impl IntoIterator<Item = &'a T>) {
    let mut shown = 0;
    for record in records {
        println!("  {record}");
        shown += 1;
    }
    if shown == 0 {
        println!("  (nothing to show)");
    }
}

/// Asks for a search text and a status, then prints the matching records
fn search_records<R: Screen>(bank: &BloodBank) -> Result<()> {
    let text = Text::new("Search:").prompt_skippable()?.unwrap_or_default();

    let statuses = R::statuses();
    let mut options = vec!["All statuses".to_owned()];
    options.extend(statuses.iter().map(|status| status.to_string()));
    let picked = Select::new("Status:", options).raw_prompt()?;
    let status = picked
        .index
        .checked_sub(1)
        .and_then(|index| statuses.get(index).copied());

    let query = Query { text, status };
    print_records(search::filter(R::store(bank).list(), &query));
    Ok(())
}

/// Runs a form until it is submitted or abandoned
fn run_form<R: Screen>(bank: &mut BloodBank, mut modal: FormModal<R>) -> Result<Option<R::Id>> {
    loop {
        let Some(draft) = modal.draft_mut() else {
            return Ok(None);
        };
        R::fill(draft)?;

        if !Confirm::new("Save?").with_default(true).prompt()? {
            modal.cancel();
            return Ok(None);
        }

        match bank.submit(&mut modal) {
            Ok(id) => return Ok(Some(id)),
            Err(error) => {
                println!("[!] {error}");
                if !Confirm::new("Correct the form?").with_default(true).prompt()? {
                    modal.cancel();
                    return Ok(None);
                }
            }
        }
    }
}

fn pick_record<R: Screen>(bank: &BloodBank, message: &str) -> Result<Option<R::Id>> {
    let records: Vec<&R> = R::store(bank).list().iter().collect();
    if records.is_empty() {
        println!("[*] Nothing here yet");
        return Ok(None);
    }
    Ok(Select::new(message, records)
        .prompt_skippable()?
        .map(|record| record.id()))
}

fn create_record<R: Screen>(bank: &mut BloodBank) -> Result<()> {
    let mut modal = FormModal::<R>::default();
    modal.open_create()?;
    if let Some(id) = run_form(bank, modal)? {
        println!("[*] Created {id}");
    }
    Ok(())
}

fn edit_record<R: Screen>(bank: &mut BloodBank) -> Result<()> {
    let Some(id) = pick_record::<R>(bank, "Which one?")? else {
        return Ok(());
    };
    let mut modal = FormModal::<R>::default();
    modal.open_edit(R::store(bank), id)?;
    if run_form(bank, modal)?.is_some() {
        println!("[*] Saved {id}");
    }
    Ok(())
}

fn delete_record<R: Screen>(bank: &mut BloodBank) -> Result<()> {
    let Some(id) = pick_record::<R>(bank, "Delete which one?")? else {
        return Ok(());
    };
    if Confirm::new(&format!("Really delete {id}?"))
        .with_default(false)
        .prompt()?
    {
        bank.delete::<R>(id)?;
        println!("[*] Deleted {id}");
    }
    Ok(())
}

/// List, search, add, edit and delete for one record kind
struct RecordMenu<'bank, R> {
    bank: &'bank mut BloodBank,
    kind: PhantomData<R>,
}

impl<'bank, R> RecordMenu<'bank, R> {
    fn new(bank: &'bank mut BloodBank) -> Self {
        Self {
            bank,
            kind: PhantomData,
        }
    }
}

#[derive(EnumIter, Display)]
enum RecordChoice {
    #[display("List all")]
    List,
    #[display("Search")]
    Search,
    #[display("Add")]
    Add,
    #[display("Edit")]
    Edit,
    #[display("Delete")]
    Delete,
    #[display("Back")]
    Back,
}

impl<R: Screen> Menu for RecordMenu<'_, R> {
    fn enter(&mut self) -> Result<MenuExit> {
        let title = format!("{} ({})", R::TITLE, R::store(self.bank).len());
        let choice = Select::new(&title, RecordChoice::iter().collect()).prompt()?;

        match choice {
            RecordChoice::List => print_records(R::store(self.bank).list()),
            RecordChoice::Search => search_records::<R>(self.bank)?,
            RecordChoice::Add => create_record::<R>(self.bank)?,
            RecordChoice::Edit => edit_record::<R>(self.bank)?,
            RecordChoice::Delete => delete_record::<R>(self.bank)?,
            RecordChoice::Back => return Ok(MENU_EXIT),
        }
        Ok(MENU_LOOP)
    }
}

/// Requests screen: the record menu plus the approval workflow
struct IssueMenu<'bank> {
    bank: &'bank mut BloodBank,
}

impl Menu for IssueMenu<'_> {
    fn enter(&mut self) -> Result<MenuExit> {
        #[derive(EnumIter, Display)]
        enum Choice {
            #[display("List all")]
            List,
            #[display("Dispatch queue")]
            Queue,
            #[display("Search")]
            Search,
            #[display("Create request")]
            Add,
            #[display("Edit request")]
            Edit,
            #[display("Approve")]
            Approve,
            #[display("Dispatch")]
            Dispatch,
            #[display("Delete")]
            Delete,
            #[display("Back")]
            Back,
        }

        let choice = Select::new("Blood requests", Choice::iter().collect()).prompt()?;
        match choice {
            Choice::List => print_records(self.bank.requests().list()),
            Choice::Queue => print_records(self.bank.dispatch_queue()),
            Choice::Search => search_records::<BloodRequest>(self.bank)?,
            Choice::Add => create_record::<BloodRequest>(self.bank)?,
            Choice::Edit => edit_record::<BloodRequest>(self.bank)?,
            Choice::Approve => {
                let picked =
                    pick_request(self.bank, RequestStatus::Pending, "Approve which request?")?;
                if let Some(id) = picked {
                    self.bank.approve_request(id)?;
                    println!("[*] {id} approved");
                }
            }
            Choice::Dispatch => {
                let picked =
                    pick_request(self.bank, RequestStatus::Approved, "Dispatch which request?")?;
                if let Some(id) = picked {
                    self.bank.dispatch_request(id)?;
                    println!("[*] {id} dispatched");
                }
            }
            Choice::Delete => delete_record::<BloodRequest>(self.bank)?,
            Choice::Back => return Ok(MENU_EXIT),
        }
        Ok(MENU_LOOP)
    }
}

/// Picks among the requests in a given status. `None` when skipped or when
/// there is nothing to pick.
fn pick_request(bank: &BloodBank, status: RequestStatus, message: &str) -> Result<Option<RequestId>> {
    let candidates = bank.requests_in(status);
    if candidates.is_empty() {
        println!("[*] No {status} request");
        return Ok(None);
    }
    Ok(Select::new(message, candidates)
        .prompt_skippable()?
        .map(|request| request.id))
}

fn show_dashboard(bank: &BloodBank) {
    println!("\nBlood stock ({} units available)", bank.available_units());
    for (group, count) in bank.stock_by_group() {
        println!("  {:>3}  {:<20} {count}", group.to_string(), "#".repeat(count));
    }

    println!("\nCollections");
    for (status, count) in bank.collection_summary() {
        println!("  {:<10} {count}", status.to_string());
    }
    println!();
}

fn show_assistant(bank: &BloodBank, threshold: usize) {
    let short = bank.low_stock(threshold);
    if short.is_empty() {
        println!("[*] Every blood group has at least {threshold} units available.");
    } else {
        let groups: Vec<String> = short.iter().map(|group| group.to_string()).collect();
        println!(
            "[!] Low stock (under {threshold} units): {}. Consider calling matching donors.",
            groups.join(", ")
        );
    }

    let critical = bank
        .dispatch_queue()
        .into_iter()
        .filter(|request| request.urgency == Urgency::Critical)
        .count();
    if critical > 0 {
        println!("[!] {critical} critical request(s) waiting in the dispatch queue.");
    }
}

fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    simple_logging::log_to_file(&config.log_file, config.log_level)?;

    App::new(BloodBank::seeded(), config).start()
}
