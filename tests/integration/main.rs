mod flows;
mod mock_oracle;
