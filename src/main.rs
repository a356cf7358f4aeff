mod dashboard;
mod filter;
mod models;
mod pagination;
mod repository;
mod source;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use std::io::{BufRead, Write};

use dashboard::DashboardViewModel;
use models::Job;
use pagination::LoadSignal;
use repository::JobRepository;
use source::{DEFAULT_API_URL, HttpJobSource};

#[derive(Parser)]
#[command(name = "jobgrid")]
#[command(about = "Job listing dashboard - fetch, filter, and browse postings")]
struct Cli {
    /// Listing endpoint to fetch postings from
    #[arg(long, global = true, default_value = DEFAULT_API_URL)]
    api: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a few pages, filter them, and print the matches
    List {
        #[command(flatten)]
        filters: FilterArgs,

        /// Number of pages to fetch before filtering
        #[arg(short, long, default_value = "3")]
        pages: usize,

        /// Keep fetching until the server reports no more postings
        #[arg(long)]
        all: bool,

        /// Emit the visible jobs as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Load the feed progressively; Enter loads the next page
    Browse {
        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Show one posting in full
    Show {
        /// Posting id (jdUid)
        id: String,
    },

    /// Print the filter values the dashboard offers
    Options,
}

#[derive(Args, Default)]
struct FilterArgs {
    /// Years of experience you have (drops roles needing more)
    #[arg(short, long)]
    experience: Option<u32>,

    /// Location preference, repeatable: onsite, remote, hybrid
    #[arg(short, long)]
    location: Vec<String>,

    /// Role, repeatable: frontend, backend, ios, android, "tech lead"
    #[arg(short, long)]
    role: Vec<String>,

    /// Minimum base salary in lakhs
    #[arg(long)]
    min_salary: Option<u32>,

    /// Company name substring, case-insensitive
    #[arg(short, long)]
    company: Option<String>,
}

impl FilterArgs {
    fn apply(&self, vm: &mut DashboardViewModel) {
        vm.set_experience(self.experience);
        vm.set_min_base_salary(self.min_salary);
        if let Some(company) = &self.company {
            vm.set_company_query(company.clone());
        }
        for location in &self.location {
            vm.add_location(location.to_lowercase());
        }
        for role in &self.role {
            vm.add_role(role.clone());
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::List {
            filters,
            pages,
            all,
            json,
        } => {
            if pages == 0 {
                bail!("--pages must be at least 1");
            }
            let mut vm = open_dashboard(&cli.api, &filters).await?;

            // The dashboard already pulled the first page on open.
            let mut fetched = 1;
            while (all || fetched < pages) && !vm.is_exhausted() {
                vm.load_more(LoadSignal::Explicit)
                    .await
                    .context("fetching next page")?;
                fetched += 1;
            }

            if json {
                let visible = vm.visible_jobs();
                println!("{}", serde_json::to_string_pretty(&visible)?);
            } else {
                render_table(&vm);
            }
        }

        Commands::Browse { filters } => {
            let mut vm = open_dashboard(&cli.api, &filters).await?;
            render_table(&vm);

            let stdin = std::io::stdin();
            loop {
                if vm.is_exhausted() {
                    println!("\nEnd of feed.");
                    break;
                }
                print!("\n[Enter] load more  ·  q quit > ");
                std::io::stdout().flush()?;

                let mut line = String::new();
                if stdin.lock().read_line(&mut line)? == 0 || line.trim() == "q" {
                    break;
                }

                // An Enter press is this shell's "scrolled near the end".
                if let Err(err) = vm.load_more(LoadSignal::NearEnd).await {
                    eprintln!("fetch failed: {err} - press Enter to retry");
                    continue;
                }
                render_table(&vm);
            }
        }

        Commands::Show { id } => {
            let mut vm = open_dashboard(&cli.api, &FilterArgs::default()).await?;

            // Page through the feed until the posting turns up.
            loop {
                if let Some(job) = vm.visible_jobs().into_iter().find(|j| j.jd_uid == id) {
                    render_detail(job);
                    return Ok(());
                }
                if vm.is_exhausted() {
                    bail!("posting '{}' not found in the feed", id);
                }
                vm.load_more(LoadSignal::Explicit)
                    .await
                    .context("fetching next page")?;
            }
        }

        Commands::Options => {
            println!("experience:  {:?}", filter::EXPERIENCE_OPTIONS);
            println!("location:    {:?}", filter::LOCATION_OPTIONS);
            println!("role:        {:?}", filter::ROLE_OPTIONS);
            println!("min salary:  {:?} (lakhs)", filter::BASE_SALARY_OPTIONS);
        }
    }

    Ok(())
}

async fn open_dashboard(api: &str, filters: &FilterArgs) -> Result<DashboardViewModel> {
    let source = HttpJobSource::new(api).context("failed to build HTTP client")?;
    let mut vm = DashboardViewModel::open(JobRepository::new(Box::new(source))).await;

    if vm.jobs_loaded() == 0 {
        if let Some(err) = vm.last_error() {
            bail!("initial fetch failed: {err}");
        }
    }

    filters.apply(&mut vm);
    Ok(vm)
}

fn render_table(vm: &DashboardViewModel) {
    let visible = vm.visible_jobs();
    if visible.is_empty() {
        println!("No matching jobs.");
    } else {
        println!(
            "{:<10} {:<14} {:<22} {:<14} {:>8} {:>12}",
            "ID", "ROLE", "COMPANY", "LOCATION", "EXP", "SALARY"
        );
        println!("{}", "-".repeat(86));
        for job in &visible {
            println!(
                "{:<10} {:<14} {:<22} {:<14} {:>8} {:>12}",
                truncate(&job.jd_uid, 8),
                truncate(&display(&job.job_role), 12),
                truncate(&capitalize_first(&display(&job.company_name)), 20),
                truncate(&capitalize_first(&display(&job.location)), 12),
                job.min_exp.map_or("-".to_string(), |e| format!("{e}+ yrs")),
                job.salary_range(),
            );
        }
    }

    let total = vm
        .total_count()
        .map_or("?".to_string(), |t| t.to_string());
    print!(
        "\nShowing {} of {} fetched (server total: {})",
        visible.len(),
        vm.jobs_loaded(),
        total
    );
    if vm.is_exhausted() {
        print!("  [end of feed]");
    }
    if let Some(at) = vm.last_fetch_at() {
        print!("  [fetched {}]", at.format("%H:%M:%S"));
    }
    println!();
}

fn render_detail(job: &Job) {
    println!("Posting {}", job.jd_uid);
    println!("Company: {}", capitalize_first(&display(&job.company_name)));
    println!("Role: {}", capitalize_first(&display(&job.job_role)));
    println!("Location: {}", capitalize_first(&display(&job.location)));
    println!("Experience: {}", job.experience_range());
    println!("Salary: {}", job.salary_range());
    if let Some(link) = &job.jd_link {
        println!("Apply: {}", link);
    }
    if let Some(logo) = &job.logo_url {
        println!("Logo: {}", logo);
    }
    if let Some(details) = &job.job_details_from_company {
        println!("\n--- About ---\n{}", details);
    }
}

fn display(field: &Option<String>) -> String {
    match field.as_deref() {
        Some(value) if !value.is_empty() => value.to_string(),
        _ => "-".to_string(),
    }
}

fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_keeps_short_strings() {
        assert_eq!(truncate("backend", 12), "backend");
        assert_eq!(truncate("a very long role name", 10), "a very ...");
    }

    #[test]
    fn test_capitalize_first() {
        assert_eq!(capitalize_first("weekday"), "Weekday");
        assert_eq!(capitalize_first(""), "");
        assert_eq!(capitalize_first("tech lead"), "Tech lead");
    }

    #[test]
    fn test_display_treats_empty_as_absent() {
        assert_eq!(display(&Some("remote".to_string())), "remote");
        assert_eq!(display(&Some(String::new())), "-");
        assert_eq!(display(&None), "-");
    }
}
